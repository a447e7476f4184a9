//! Framework-agnostic business logic. Every operation takes an explicit
//! database handle and returns [`crate::errors::Result`].

/// First-administrator bootstrap and password hashing
pub mod admin;
/// Batched primary-key lookups
pub mod lookup;
/// Member intake and the member directory
pub mod member;
/// Enrolment periods and their payment headers
pub mod membership;
/// Payment ledger: headers, postings, corrections, history and summary
pub mod payment;
/// Membership plan catalog
pub mod plan;
