//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod member;
pub mod membership;
pub mod membership_plan;
pub mod payment;
pub mod payment_transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use membership::{
    Column as MembershipColumn, Entity as Membership, MembershipStatus, Model as MembershipModel,
};
pub use membership_plan::{
    Column as MembershipPlanColumn, Entity as MembershipPlan, Model as MembershipPlanModel,
};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentMode, PaymentStatus,
};
pub use payment_transaction::{
    Column as PaymentTransactionColumn, Entity as PaymentTransaction,
    Model as PaymentTransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserRole};
