use std::process::ExitCode;

use account_client::auth::SignUpForm;
use account_client::configuration::get_configuration;
use account_client::error::{ApiError, AppError};
use account_client::services::{PasswordChange, Profile};
use account_client::startup::Application;
use account_client::telemetry::init_telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Command-line client for the account service", long_about = None)]
struct Cli {
    /// Overrides `api.base_url` from the configuration
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    SignIn {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    SignUp {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password2: String,
        /// Accept the terms of service
        #[arg(long)]
        agree: bool,
    },
    /// Show who is signed in
    Whoami,
    Profile,
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    ChangePassword {
        #[arg(long)]
        old_password: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_new_password: String,
    },
    Feed,
    Post {
        text: String,
    },
    Reverse {
        #[arg(default_value = "hello, world!!!")]
        message: String,
    },
    /// Forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 구조화된 로깅 초기화
    init_telemetry("warn");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    // 설정 로드
    let mut configuration = get_configuration()?;
    if let Some(base_url) = cli.base_url {
        configuration.api.base_url = base_url;
    }
    tracing::info!(base_url = %configuration.api.base_url, "Configuration loaded");

    let app = Application::build(&configuration)?;

    // 저장된 refresh 토큰으로 세션 복구
    app.bootstrap().await;

    match cli.command {
        Command::SignIn { username, password } => {
            if username.is_empty() || password.is_empty() {
                return Err(AppError::InvalidInput(
                    "Please enter your username and password".to_string(),
                ));
            }
            let session = app.accounts.sign_in(&username, &password).await.map_err(|e| {
                match e {
                    ApiError::Validation { .. } => {
                        AppError::InvalidInput("Invalid username or password".to_string())
                    }
                    other => other.into(),
                }
            })?;
            println!("Signed in as {}", session.username());
        }
        Command::SignUp {
            username,
            email,
            password,
            password2,
            agree,
        } => {
            let form = SignUpForm {
                username,
                email,
                password,
                password2,
                agreement: agree,
            };
            let session = app.accounts.sign_up(&form).await?;
            println!("Welcome, {}!", session.username());
        }
        Command::Whoami => {
            let session = app.store.session();
            if session.is_anonymous() {
                println!("Not signed in");
            } else {
                println!("{} (id {})", session.username(), session.user_id());
                if let Some(expires_at) = session.user().expires_at() {
                    println!("Access token expires at {}", expires_at.to_rfc3339());
                }
            }
        }
        Command::Profile => {
            require_session(&app)?;
            let profile = app.users.profile().await?;
            print_profile(&profile);
        }
        Command::UpdateProfile { name, website, bio } => {
            require_session(&app)?;
            let mut profile = app.users.profile().await?;
            if let Some(name) = name {
                profile.name = name;
            }
            if let Some(website) = website {
                profile.website = website;
            }
            if let Some(bio) = bio {
                profile.bio = bio;
            }
            let saved = app.users.update_profile(&profile).await?;
            println!("Profile updated");
            print_profile(saved.as_ref().unwrap_or(&profile));
        }
        Command::ChangePassword {
            old_password,
            new_password,
            confirm_new_password,
        } => {
            require_session(&app)?;
            let change = PasswordChange {
                old_password,
                new_password,
                confirm_new_password,
            };
            app.users.change_password(&change).await?;
            println!("Password changed");
        }
        Command::Feed => {
            for post in app.posts.all_posts().await? {
                match post.username {
                    Some(username) => println!("@{}: {}", username, post.text),
                    None => println!("{}", post.text),
                }
            }
        }
        Command::Post { text } => {
            require_session(&app)?;
            app.posts.add_post(&text).await?;
            println!("Posted");
        }
        Command::Reverse { message } => {
            require_session(&app)?;
            let reversed = app.reverse.reverse(&message).await?;
            println!("{}", reversed);
        }
        Command::Logout => {
            // 저장된 refresh 토큰을 지우지 못하면 로그아웃 실패로 보고
            app.accounts.sign_out()?;
            println!("Signed out");
        }
    }

    Ok(())
}

fn require_session(app: &Application) -> Result<(), AppError> {
    if app.store.session().is_anonymous() {
        return Err(AppError::SignInRequired);
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!("Name:    {}", profile.name);
    println!("Website: {}", profile.website);
    println!("Bio:     {}", profile.bio);
}

fn report(error: &AppError) {
    match error {
        AppError::Api(e) => {
            eprintln!("{}", e.user_message());
            let field_errors = e.field_errors();
            for field in field_errors.fields() {
                if let Some(rendered) = field_errors.render(field) {
                    eprintln!("{}:\n{}", field, rendered);
                }
            }
        }
        AppError::SignInRequired => eprintln!("Please sign in first"),
        AppError::Storage(e) => eprintln!("Could not update the saved session: {}", e),
        AppError::InvalidInput(message) => eprintln!("{}", message),
        other => {
            tracing::error!(error = %other, "Command failed");
            eprintln!("Something went wrong: {}", other);
        }
    }
}
