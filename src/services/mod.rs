pub mod checkout_sync;
pub mod event_router;
pub mod integration;
pub mod invoice_sync;
pub mod portal_reconciler;
pub mod subscription_sync;
pub mod webhook_registrar;
