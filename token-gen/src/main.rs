use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use jsonwebtoken::Algorithm;
use token_auth::services::token::{Grant, RoleGrant, TokenCodec, TokenData};

/// Issue a signed bearer token for local testing.
///
/// - Signs with a PKCS#8 private key (PEM or bare base64 DER)
/// - Claims: jti (id), sub (username), grants, iat, exp
/// - Grants must be known role grants (`role-user`, `role-admin`; `ROLE_USER` also works)
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Path to the signing key
    #[arg(long, value_name = "FILE")]
    private_key: PathBuf,

    /// Signature algorithm (RS256/384/512, PS256/384/512, ES256/384, EdDSA)
    #[arg(long, default_value = "RS512")]
    algorithm: String,

    /// Token id (jti)
    #[arg(long)]
    id: i64,

    /// Subject (sub)
    #[arg(long)]
    username: String,

    /// Grant to include; repeat for more
    #[arg(long = "grant")]
    grants: Vec<String>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    lifetime: u64,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let key = fs::read_to_string(&args.private_key)
        .with_context(|| format!("failed to read {}", args.private_key.display()))?;
    let algorithm: Algorithm = args
        .algorithm
        .parse()
        .with_context(|| format!("unknown algorithm: {}", args.algorithm))?;
    let codec = TokenCodec::new(&key, algorithm, args.lifetime)
        .context("failed to load signing key")?;

    let grants = args
        .grants
        .iter()
        .map(|raw| {
            raw.parse::<RoleGrant>()
                .map(Grant::from)
                .with_context(|| format!("unknown grant: {raw}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let data = TokenData::new(args.id, args.username.as_str(), grants);
    let token = codec.encode(&data).context("failed to sign token")?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    let grants: Vec<&str> = data.grants().iter().map(Grant::as_str).collect();
    println!("token: {}", token);
    println!("id (jti): {}", data.id());
    println!("username (sub): {}", data.username());
    println!("grants: [{}]", grants.join(", "));
    println!("algorithm: {:?}", codec.algorithm());
    println!("expires_in: {}", codec.lifetime_seconds());

    Ok(())
}
