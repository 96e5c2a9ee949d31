//! # Workflow360 Account Flows
//!
//! The client-side controllers for Workflow360's account screens: the
//! forgot-password wizard, the resolver-driven reset page, login, and
//! email verification. Each controller drives remote calls against an
//! injected [`IdentityProvider`](workflow360_core::IdentityProvider) and
//! exposes plain state (`step`, `error`, `loading`) for a UI to render.
//!
//! Timers (the resend cooldown and the post-success redirect) are scoped
//! values: dropping a controller cancels anything it scheduled.

pub mod cooldown;
pub mod login;
pub mod navigate;
pub mod otp;
pub mod recovery;
pub mod reset;
pub mod resolver;
pub mod verify;

pub use cooldown::ResendCooldown;
pub use login::LoginFlow;
pub use navigate::{
    Navigator, ScheduledRedirect, DASHBOARD_ROUTE, LOGIN_ROUTE, SUCCESS_REDIRECT_DELAY,
    VERIFY_EMAIL_ROUTE,
};
pub use otp::{OtpInput, OTP_LEN};
pub use recovery::{RecoveryController, RecoveryStep, RESEND_COOLDOWN_SECS};
pub use reset::{ResetPasswordFlow, ResetStage};
pub use resolver::{RecoverySessionResolver, ResolvedMode, EVENT_WAIT};
pub use verify::EmailVerificationFlow;
