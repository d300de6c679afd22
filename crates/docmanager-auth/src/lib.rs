//! DocManager Auth: authorization voters, session re-validation,
//! password reset lifecycle, admin access editing and audit logging.

pub mod access;
pub mod activity;
pub mod clock;
pub mod config;
pub mod error;
pub mod mailer;
pub mod password;
pub mod registry;
pub mod reset;
pub mod session;
pub mod token;
pub mod voter;

pub use access::AccessEditor;
pub use activity::ActivityLogger;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PasswordPolicy, ResetConfig};
pub use error::AuthError;
pub use mailer::{BaseUrlLinkBuilder, EmailMessage, LinkBuilder, Mailer};
pub use registry::VoterRegistry;
pub use reset::{PasswordResetService, ResetPasswordResponse, ResetRequestResponse};
pub use session::{DenialOutcome, SecurityContext, SessionRevalidator};
pub use voter::{ResourceVoter, RoleVoter, Subject, Vote, Voter, is_privileged};
