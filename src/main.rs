use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use apps_script_runner::request::{Alt, InvocationRequest, UnsetParams};
use apps_script_runner::{runcode, tool, EnvTokenProvider, ScriptRunner};
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input};
use indicatif::{ProgressBar, ProgressStyle};

/// Run a function in a deployed Apps Script project.
#[derive(Debug, Parser)]
#[command(name = "apps-script-run", version)]
struct Args {
    /// Script ID of the project to run. Prompted for when omitted.
    script_id: Option<String>,

    /// Selector for a partial response.
    #[arg(long)]
    fields: Option<String>,

    #[arg(long, value_enum, default_value_t = Alt::Json)]
    alt: Alt,

    /// API key.
    #[arg(long)]
    key: Option<String>,

    /// OAuth access token sent as a query parameter.
    #[arg(long)]
    access_token: Option<String>,

    /// OAuth 2.0 token for the current user.
    #[arg(long)]
    oauth_token: Option<String>,

    #[arg(long)]
    quota_user: Option<String>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pretty_print: bool,

    /// Send unset parameters as the literal `undefined`.
    #[arg(long)]
    send_undefined: bool,

    /// Base64-encoded JSON request, used instead of the flags above.
    #[arg(long, conflicts_with = "script_id")]
    runcode: Option<String>,

    /// Print the runcode for this request and exit.
    #[arg(long)]
    emit_runcode: bool,

    /// Print the `script_run` tool definition and exit.
    #[arg(long)]
    describe: bool,

    /// Environment variable holding the bearer token.
    #[arg(long, default_value = apps_script_runner::auth::ACCESS_TOKEN_ENV)]
    token_env: String,
}

impl Args {
    fn into_request(self) -> anyhow::Result<InvocationRequest> {
        if let Some(code) = &self.runcode {
            println!("Running with Runcode: {code}");
            return runcode::request_from_runcode(code).context("invalid runcode");
        }

        let script_id = match self.script_id {
            Some(id) => id,
            None => Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Script ID?")
                .interact_text()
                .context("failed to read script ID")?,
        };

        Ok(InvocationRequest {
            script_id,
            fields: self.fields,
            alt: self.alt,
            key: self.key,
            access_token: self.access_token,
            oauth_token: self.oauth_token,
            quota_user: self.quota_user,
            pretty_print: self.pretty_print,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args = Args::parse();

    if args.describe {
        println!("{}", serde_json::to_string_pretty(&tool::definition())?);
        return Ok(ExitCode::SUCCESS);
    }

    let unset = if args.send_undefined {
        UnsetParams::SendUndefined
    } else {
        UnsetParams::Omit
    };
    let emit_runcode = args.emit_runcode;
    let token_env = args.token_env.clone();
    let request = args.into_request()?;

    if emit_runcode {
        println!("{}", runcode::runcode_from_request(&request)?);
        return Ok(ExitCode::SUCCESS);
    }

    let runner = ScriptRunner::builder()
        .auth(EnvTokenProvider::new(token_env))
        .unset_params(unset)
        .build()?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    bar.set_message(format!("Running script {}...", request.script_id));
    bar.enable_steady_tick(Duration::from_millis(100));

    let result = runner.run_or_record(&request).await;
    let failed = result.get("error") == Some(&serde_json::Value::Bool(true));

    if failed {
        bar.finish_with_message("Script run failed!");
    } else {
        bar.finish_with_message("Script run finished!");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
