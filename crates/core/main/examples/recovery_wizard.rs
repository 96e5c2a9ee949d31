//! Walks the forgot-password wizard against the in-memory provider.
//!
//! Run with: `cargo run -p workflow360 --example recovery_wizard`

use std::sync::Arc;

use workflow360::flows::{Navigator, RecoveryController};
use workflow360::prelude::*;
use workflow360::MemoryProvider;

struct PrintingNavigator;

impl Navigator for PrintingNavigator {
    fn navigate(&self, route: &str) {
        println!("-> navigating to {route}");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let provider = Arc::new(MemoryProvider::new());
    provider.seed_user("user@example.com", "Oldpass1", true).await;

    let mut wizard = RecoveryController::new(provider.clone(), Arc::new(PrintingNavigator));

    wizard.submit_email("user@example.com").await;
    println!("step after email: {:?}", wizard.step());

    // Read the code off the outbox, the way the user reads their inbox.
    let code = provider
        .last_code_for("user@example.com", OtpPurpose::Recovery)
        .await
        .expect("a code was delivered");
    println!("code delivered: {code}");

    wizard.otp().paste(&code);
    wizard.submit_otp().await;
    println!("step after otp: {:?}", wizard.step());

    wizard.submit_password("Abcdefg1", "Abcdefg1").await;
    println!("step after password: {:?}", wizard.step());

    // Give the 2-second success redirect a chance to fire.
    tokio::time::sleep(std::time::Duration::from_millis(2200)).await;
}
