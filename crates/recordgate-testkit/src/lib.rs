//! # recordgate testkit
//!
//! Testing utilities for recordgate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Read-gate cases**: Known read scenarios with their expected outcome
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Read-Gate Cases
//!
//! Every case is a single record, a single reader and the error kind the
//! read must produce:
//!
//! ```rust
//! use recordgate_testkit::cases::{all_cases, run_case};
//!
//! for case in all_cases() {
//!     assert_eq!(run_case(&case), case.expected, "{}", case.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use recordgate_testkit::generators::ReadParams;
//!
//! proptest! {
//!     #[test]
//!     fn listed_reader_with_role_reads(params: ReadParams) {
//!         prop_assume!(params.should_succeed());
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use recordgate_testkit::fixtures::{TestFixture, FIXTURE_NOW};
//! use recordgate_core::Role;
//!
//! let fixture = TestFixture::new();
//! let key = fixture.key("test");
//! let state = fixture.state_with_record(key, b"test data", Role::new(1));
//! assert!(state.get_record(&fixture.alice, &key, FIXTURE_NOW).is_ok());
//! ```

pub mod cases;
pub mod fixtures;
pub mod generators;

pub use cases::{all_cases, failing_cases, run_case, ReadCase};
pub use fixtures::{multi_party_identities, random_payload, TestFixture, FIXTURE_NOW};
pub use generators::ReadParams;
