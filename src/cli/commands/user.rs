use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::NewUser;
use crate::database::Store;
use crate::services::users::Registration;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "FOODGRAM_ADMIN_PASSWORD")]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "Foodgram")]
        last_name: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::CreateAdmin { email, username, password, first_name, last_name } => {
            let registration = Registration { email, username, first_name, last_name, password };
            registration.validate()?;

            let user = crate::cli::repository()?
                .insert_user(&NewUser {
                    password_hash: hash_password(&registration.password)
                        .map_err(|e| anyhow::anyhow!("hashing password: {}", e))?,
                    email: registration.email,
                    username: registration.username,
                    first_name: registration.first_name,
                    last_name: registration.last_name,
                    role: Role::Admin,
                })
                .await?;

            output_success(
                &output_format,
                &format!("Created admin {}", user.username),
                Some(json!({ "id": user.id, "email": user.email })),
            )
        }
    }
}
