//! Interactive flow screens.
//!
//! Renders the current [`FlowState`] as styled terminal output and feeds
//! user choices back into the controller. All flow rules live in
//! `event-flow`; this module only draws and prompts.

use anyhow::Result;
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use event_api::EventApiClient;
use event_flow::{validate, FlowController, FlowError, FlowState};

pub async fn run(client: EventApiClient) -> Result<()> {
    let term = Term::stdout();
    let theme = ColorfulTheme::default();
    let mut controller = FlowController::new(client);

    loop {
        render(controller.state());

        match controller.state().clone() {
            FlowState::Initial => {
                let options = ["Apply for the gift", "Quit"];
                match pick(&term, &theme, &options)? {
                    0 => {
                        controller.start_application()?;
                    }
                    _ => break,
                }
            }

            FlowState::EmailEntry => {
                let email: String = Input::with_theme(&theme)
                    .with_prompt("Email address")
                    .validate_with(|input: &String| {
                        if validate::is_valid_email(input) {
                            Ok(())
                        } else {
                            Err("enter an address like user@domain.tld")
                        }
                    })
                    .interact_text()?;
                if let Err(err) = controller.send_code(&email).await {
                    report(&err);
                }
            }

            FlowState::CodeEntry { .. } => {
                let remaining = controller.resend_available_in();
                let resend_label = if remaining > 0 {
                    format!("Resend code (available in {remaining}s)")
                } else {
                    "Resend code".to_string()
                };
                let options = [
                    "Enter the code".to_string(),
                    resend_label,
                    "Start over".to_string(),
                    "Quit".to_string(),
                ];
                match pick(&term, &theme, &options)? {
                    0 => {
                        let code: String = Input::with_theme(&theme)
                            .with_prompt("6-digit code")
                            .validate_with(|input: &String| {
                                if validate::is_valid_code(input) {
                                    Ok(())
                                } else {
                                    Err("the code is exactly 6 characters")
                                }
                            })
                            .interact_text()?;
                        if let Err(err) = controller.verify_code(&code).await {
                            report(&err);
                        }
                    }
                    1 => {
                        if let Err(err) = controller.resend_code().await {
                            report(&err);
                        }
                    }
                    2 => {
                        controller.restart();
                    }
                    _ => break,
                }
            }

            FlowState::Verified { .. } => {
                let options = ["Apply for the gift", "Start over", "Quit"];
                match pick(&term, &theme, &options)? {
                    0 => {
                        if let Err(err) = controller.apply().await {
                            report(&err);
                        }
                    }
                    1 => {
                        controller.restart();
                    }
                    _ => break,
                }
            }

            // Transient while the request runs; never shown between prompts.
            FlowState::Applying { .. } => continue,

            FlowState::ApplicationReceived { .. } => {
                let options = ["Check my status", "Start over", "Quit"];
                match pick(&term, &theme, &options)? {
                    0 => {
                        if let Err(err) = controller.check_status().await {
                            report(&err);
                        }
                    }
                    1 => {
                        controller.restart();
                    }
                    _ => break,
                }
            }

            FlowState::Error { .. } => {
                let options = ["Try again", "Quit"];
                match pick(&term, &theme, &options)? {
                    0 => {
                        controller.start_application()?;
                    }
                    _ => break,
                }
            }

            // Success, SoldOut, AlreadyApplied: only a full restart remains.
            _ => {
                let options = ["Start over", "Quit"];
                match pick(&term, &theme, &options)? {
                    0 => {
                        controller.restart();
                    }
                    _ => break,
                }
            }
        }
    }

    println!("{}", "Thank you for every moment together. 👋".bright_blue());
    Ok(())
}

fn pick(term: &Term, theme: &ColorfulTheme, options: &[impl ToString]) -> Result<usize> {
    let selection = Select::with_theme(theme)
        .with_prompt("What would you like to do?")
        .items(options)
        .default(0)
        .interact_on(term)?;
    Ok(selection)
}

fn render(state: &FlowState) {
    println!();
    match state {
        FlowState::Initial => {
            println!("{}", "We prepared one last gift.".bold());
            println!("First come, first served.");
        }
        FlowState::EmailEntry => {
            println!("{}", "Verify your email".bold());
            println!("We'll send a verification code to your inbox.");
        }
        FlowState::CodeEntry { email } => {
            println!("{}", "Enter your verification code".bold());
            println!("A 6-digit code was sent to {}.", email.bright_cyan());
        }
        FlowState::Verified { email, .. } => {
            println!("{}", "Email verified!".bright_green().bold());
            println!("{} can now apply for the gift.", email.bright_cyan());
        }
        FlowState::Applying { .. } => {
            println!("Applying, one moment...");
        }
        FlowState::ApplicationReceived { .. } => {
            println!("{}", "Your application has been received!".bright_green().bold());
            println!("The final result arrives by email; only first-come winners are confirmed.");
        }
        FlowState::Success => {
            println!("{}", "🎉 Your application is complete!".bright_green().bold());
            println!("Thank you for being with us until the end.");
        }
        FlowState::SoldOut => {
            println!("{}", "All gifts are gone.".yellow().bold());
            println!("Thank you so much for taking part anyway.");
        }
        FlowState::AlreadyApplied => {
            println!("{}", "This email has already applied.".yellow().bold());
            println!("We hope to see you at the hand-off!");
        }
        FlowState::Error { detail } => {
            println!("{} {}", "Something went wrong:".bright_red().bold(), detail);
        }
    }
}

fn report(err: &FlowError) {
    println!("{} {}", "✗".bright_red(), err.to_string().bright_red());
}
