use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use file_vault::crypto::encryption::KDF_ITERATIONS;
use file_vault::crypto::password::{generate_password, PasswordStrength};
use file_vault::crypto::{self, Encryptor, Envelope};
use file_vault::format_bytes;
use tokio::fs;
use tracing::debug;

/// Client-side companion of the vault: everything that happens in the browser
/// before an upload, and the decrypt path the server never performs.
#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "File vault client tools", long_about = None)]
pub struct Cli {
    /// PBKDF2 iteration count used for key derivation
    #[arg(long, global = true, default_value_t = KDF_ITERATIONS)]
    iterations: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the SHA-256 digest of a file
    Hash {
        file: PathBuf,
    },

    /// Encrypt a file for upload
    Encrypt {
        file: PathBuf,

        /// Zero-knowledge password; one is generated when omitted
        #[arg(short, long)]
        password: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a file downloaded from the vault
    Decrypt {
        file: PathBuf,

        #[arg(short, long)]
        password: String,

        /// Nonce as comma-separated bytes
        #[arg(long)]
        iv: String,

        /// Salt as comma-separated bytes
        #[arg(long)]
        salt: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check a password against the zero-knowledge rules
    CheckPassword {
        password: String,
    },
}

async fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn write_output(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    fs::write(path, data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn default_encrypted_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".enc");
    PathBuf::from(name)
}

pub async fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    let encryptor = Encryptor::new(cli.iterations);

    match &cli.command {
        Commands::Hash { file } => {
            let data = read_input(file).await?;
            println!("{}  {}", crypto::digest(&data), file.display());
        }
        Commands::Encrypt { file, password, output } => {
            let data = read_input(file).await?;

            let (password, generated) = match password {
                Some(password) => {
                    let strength = PasswordStrength::evaluate(password);
                    if !strength.is_valid() {
                        bail!("Password too weak, it needs {}", strength.missing().join(", "));
                    }
                    (password.clone(), false)
                }
                None => (generate_password(), true),
            };

            let digest = crypto::digest(&data);
            let sealed = encryptor.encrypt(&data, &password)?;
            let output = output.clone().unwrap_or_else(|| default_encrypted_path(file));
            write_output(&output, &sealed.ciphertext).await?;
            debug!(iterations = encryptor.iterations(), "file encrypted");

            println!("hash: {}", digest);
            println!("iv: {}", sealed.envelope.iv_wire());
            println!("salt: {}", sealed.envelope.salt_wire());
            if generated {
                println!("password: {}", password);
            }
            println!(
                "written: {} ({})",
                output.display(),
                format_bytes(sealed.ciphertext.len() as u64)
            );
        }
        Commands::Decrypt { file, password, iv, salt, output } => {
            let data = read_input(file).await?;
            let envelope = Envelope::from_wire(iv, salt)?;
            let plain = encryptor.decrypt(&data, password, &envelope)?;
            write_output(output, &plain).await?;

            println!("hash: {}", crypto::digest(&plain));
            println!("written: {} ({})", output.display(), format_bytes(plain.len() as u64));
        }
        Commands::CheckPassword { password } => {
            let strength = PasswordStrength::evaluate(password);
            println!("score: {}/5", strength.score());
            if !strength.is_valid() {
                bail!("Password too weak, it needs {}", strength.missing().join(", "));
            }
            println!("password ok");
        }
    }

    Ok(())
}
