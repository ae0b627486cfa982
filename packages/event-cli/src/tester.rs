//! Scripted endpoint tester.
//!
//! Exercises the backend endpoints one by one with prompted inputs,
//! printing a timestamped pass/fail transcript. Handy against a staging
//! deployment before the event goes live.

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};

use event_api::EventApiClient;
use event_flow::validate;

use crate::TestStep;

pub async fn run(client: &EventApiClient, step: TestStep) -> Result<()> {
    let theme = ColorfulTheme::default();

    match step {
        TestStep::Send => {
            let email = prompt_email(&theme)?;
            send(client, &email).await;
        }
        TestStep::Verify => {
            let email = prompt_email(&theme)?;
            let code = prompt_code(&theme)?;
            verify(client, &email, &code).await;
        }
        TestStep::Apply => {
            let token = prompt_token(&theme)?;
            apply(client, &token).await;
        }
        TestStep::Status => {
            let token = prompt_token(&theme)?;
            status(client, &token).await;
        }
        TestStep::All => {
            let email = prompt_email(&theme)?;
            if !send(client, &email).await {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_secs(1)).await;

            let code = prompt_code(&theme)?;
            let Some(token) = verify(client, &email, &code).await else {
                return Ok(());
            };
            tokio::time::sleep(Duration::from_secs(1)).await;

            apply(client, &token).await;
            tokio::time::sleep(Duration::from_secs(1)).await;

            status(client, &token).await;
        }
    }

    Ok(())
}

async fn send(client: &EventApiClient, email: &str) -> bool {
    match client.send_verification_code(email).await {
        Ok(()) => {
            pass("send-verification-code", None);
            true
        }
        Err(err) => {
            fail("send-verification-code", &err);
            false
        }
    }
}

async fn verify(client: &EventApiClient, email: &str, code: &str) -> Option<String> {
    match client.verify_code(email, code).await {
        Ok(token) => {
            pass("verify-code", Some(format!("token: {token}")));
            Some(token)
        }
        Err(err) => {
            fail("verify-code", &err);
            None
        }
    }
}

async fn apply(client: &EventApiClient, token: &str) -> bool {
    match client.apply(token).await {
        Ok(ack) => {
            pass("apply", Some(format!("{ack:?}")));
            true
        }
        Err(err) => {
            fail("apply", &err);
            false
        }
    }
}

async fn status(client: &EventApiClient, token: &str) -> bool {
    match client.application_status(token).await {
        Ok(status) => {
            pass("status", Some(format!("status: {status}")));
            true
        }
        Err(err) => {
            fail("status", &err);
            false
        }
    }
}

fn prompt_email(theme: &ColorfulTheme) -> Result<String> {
    let email = Input::with_theme(theme)
        .with_prompt("Email address")
        .default("test@example.com".to_string())
        .validate_with(|input: &String| {
            if validate::is_valid_email(input) {
                Ok(())
            } else {
                Err("enter an address like user@domain.tld")
            }
        })
        .interact_text()?;
    Ok(email)
}

fn prompt_code(theme: &ColorfulTheme) -> Result<String> {
    let code = Input::with_theme(theme)
        .with_prompt("Verification code from the email")
        .validate_with(|input: &String| {
            if validate::is_valid_code(input) {
                Ok(())
            } else {
                Err("the code is exactly 6 characters")
            }
        })
        .interact_text()?;
    Ok(code)
}

fn prompt_token(theme: &ColorfulTheme) -> Result<String> {
    let token = Input::with_theme(theme)
        .with_prompt("Auth token (from verify-code)")
        .interact_text()?;
    Ok(token)
}

fn pass(step: &str, extra: Option<String>) {
    let stamp = Local::now().format("%H:%M:%S");
    match extra {
        Some(extra) => println!(
            "{} {} {} {}",
            stamp.to_string().dimmed(),
            "✓".bright_green(),
            step,
            extra.dimmed()
        ),
        None => println!("{} {} {}", stamp.to_string().dimmed(), "✓".bright_green(), step),
    }
}

fn fail(step: &str, err: &event_api::ApiError) {
    let stamp = Local::now().format("%H:%M:%S");
    println!(
        "{} {} {} {}",
        stamp.to_string().dimmed(),
        "✗".bright_red(),
        step,
        err.to_string().bright_red()
    );
}
