//! Verifies one Cognito token and prints the result as JSON.
//!
//! ```text
//! AWS_REGION=ap-northeast-2 POOL_USER_ID=ap-northeast-2_8WMH5DCrb verify-claim <token>
//! ```

use clap::Parser;
use cognito_jwt::{ClaimVerifyRequest, TokenUse, TokenVerifier, VerifierConfig};
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "verify-claim", version, about = "Verify a Cognito user pool JWT")]
struct Cli {
    /// Token to verify; read from stdin when omitted.
    token: Option<String>,

    /// AWS region of the user pool.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// User pool id.
    #[arg(long, env = "POOL_USER_ID")]
    pool_id: Option<String>,

    /// Full issuer URL; takes precedence over --region/--pool-id.
    #[arg(long, env = "CLAIM_VERIFY_ISSUER")]
    issuer: Option<String>,

    /// Timeout for the JWKS request, in seconds.
    #[arg(long, env = "CLAIM_VERIFY_FETCH_TIMEOUT_SECS", default_value_t = 5)]
    fetch_timeout_secs: u64,

    /// Only accept tokens with this token_use ("access" or "id").
    #[arg(long, env = "CLAIM_VERIFY_TOKEN_USE")]
    token_use: Option<TokenUse>,
}

impl Cli {
    fn config(&self) -> Result<VerifierConfig, String> {
        let config = match (&self.issuer, &self.region, &self.pool_id) {
            (Some(issuer), _, _) => VerifierConfig::new(issuer.clone()),
            (None, Some(region), Some(pool_id)) => VerifierConfig::for_user_pool(region, pool_id),
            _ => return Err("either --issuer or both --region and --pool-id are required".into()),
        };
        let config = config.with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs));
        Ok(match self.token_use {
            Some(token_use) => config.with_required_token_use(token_use),
            None => config,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<bool, String> {
    let config = cli.config()?;
    let token = match cli.token {
        Some(token) => token,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| format!("failed to read token from stdin: {e}"))?;
            buf
        }
    };

    let verifier = TokenVerifier::new(config).map_err(|e| e.to_string())?;
    let result = verifier
        .verify_claim(&ClaimVerifyRequest::new(token.trim()))
        .await;

    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(result.is_valid)
}
