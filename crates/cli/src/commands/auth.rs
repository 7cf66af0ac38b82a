//! Sign-in and account commands.

use secrecy::{ExposeSecret, SecretString};

use store_rating_core::validation::validate_password;

use super::{CliError, Context};
use crate::output::say;

/// Sign in and store the session.
///
/// # Errors
///
/// Returns the login failure as the message the API sent, or a generic one.
pub async fn login(ctx: &Context, email: &str, password: &SecretString) -> Result<(), CliError> {
    let session = ctx
        .lifecycle()
        .login(email.trim(), password)
        .await
        .map_err(|e| CliError::Rejected(e.user_message()))?;

    say(&format!(
        "Signed in as {} ({}). Dashboard: {}",
        session.name,
        session.role.label(),
        session.dashboard().title()
    ));
    Ok(())
}

/// Forget the stored session.
///
/// # Errors
///
/// Returns an error if the session file cannot be removed.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.lifecycle().logout().await?;
    say("Signed out.");
    Ok(())
}

/// Show the stored session.
///
/// # Errors
///
/// Returns [`CliError::NotSignedIn`] if there is none.
pub async fn whoami(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.session().await?;
    say(&format!("{} <{}>", session.name, session.email));
    say(&format!("Role:      {}", session.role.label()));
    say(&format!("Dashboard: {}", session.dashboard().title()));
    say(&format!(
        "Since:     {}",
        session.signed_in_at.format("%Y-%m-%d %H:%M UTC")
    ));
    Ok(())
}

/// Change the caller's password.
///
/// The new password must pass the signup rules before anything is sent.
///
/// # Errors
///
/// Returns a validation error, or the API's message if it refuses.
pub async fn password(
    ctx: &Context,
    current: &SecretString,
    new: &SecretString,
) -> Result<(), CliError> {
    let session = ctx.session().await?;

    if current.expose_secret().is_empty() {
        return Err(CliError::InvalidInput(
            "Please enter your current password.".to_string(),
        ));
    }
    validate_password(new.expose_secret())?;

    // A 401 here usually means a wrong current password; the session stays.
    session
        .client(ctx.lifecycle().api())
        .update_password(current, new)
        .await
        .map_err(|e| CliError::Rejected(e.user_message("Error updating password.")))?;

    say("Password updated successfully.");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::tests::{context, sign_in};
    use store_rating_core::{Role, ValidationError};

    #[tokio::test]
    async fn test_password_validated_before_request() {
        let ctx = context("pw");
        sign_in(&ctx, Role::User).await;

        // The API at port 9 is unreachable, so reaching it would be a
        // Rejected error rather than a validation error.
        let result = password(
            &ctx,
            &SecretString::from("Old123!@"),
            &SecretString::from("weak"),
        )
        .await;
        assert!(matches!(
            result,
            Err(CliError::Validation(ValidationError::Password))
        ));

        let result = password(&ctx, &SecretString::from(""), &SecretString::from("New123!@")).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));

        ctx.lifecycle().logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_without_session_succeeds() {
        let ctx = context("logout");
        logout(&ctx).await.unwrap();
        assert!(matches!(whoami(&ctx).await, Err(CliError::NotSignedIn)));
    }
}
