pub mod checkout;
pub mod error;
pub mod event;
pub mod id;
pub mod invoice;
pub mod member;
pub mod notify;
pub mod portal;
pub mod provider;
pub mod subscription;
pub mod webhook;
