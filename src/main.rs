use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use textbook_rsa::{BitLengthPolicy, KeyGenConfig, KeyGenerator, OsSource, RsaCipher, RsaKeyPair};

#[derive(Parser)]
#[command(name = "textbook-rsa")]
#[command(about = "Textbook RSA key generation and block cipher")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct KeyArgs {
    /// Modulus size in bits
    #[arg(short, long, default_value = "512")]
    bits: u32,
    /// Fixed seed for reproducible keys
    #[arg(long, conflicts_with = "secure")]
    seed: Option<u64>,
    /// Miller-Rabin rounds per candidate
    #[arg(long, default_value = "10")]
    rounds: u32,
    /// Force each prime to exactly bits/2 significant bits
    #[arg(long)]
    exact: bool,
    /// Draw primes from the OS CSPRNG instead of the xorshift source
    #[arg(long)]
    secure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a keypair and print both keys
    Keygen {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Round-trip a message through encrypt/decrypt and sign/verify
    Demo {
        #[command(flatten)]
        key: KeyArgs,
        /// Message to process
        #[arg(short, long, default_value = "Hello, RSA!")]
        message: String,
    },
}

fn generate(args: &KeyArgs) -> Result<RsaKeyPair> {
    let mut config = KeyGenConfig::default().with_rounds(args.rounds);
    if args.exact {
        config = config.with_bit_policy(BitLengthPolicy::Exact);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let generator = KeyGenerator::new(config);
    let keypair = if args.secure {
        generator.generate_keypair_with(args.bits, &mut OsSource, &mut OsSource)
    } else {
        generator.generate_keypair(args.bits)
    };
    keypair.with_context(|| format!("generating a {}-bit keypair", args.bits))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { key } => {
            let keypair = generate(&key)?;
            print!("{}", keypair.public_key().to_pem());
            print!("{}", keypair.private_key().to_pem());
        }

        Commands::Demo { key, message } => {
            let keypair = generate(&key)?;
            let cipher = RsaCipher::default();
            let public = keypair.public_key();
            let private = keypair.private_key();

            println!("modulus bits: {}", keypair.bit_length());
            println!("e: {}", keypair.public_exponent());

            let ciphertext = cipher
                .encrypt(message.as_bytes(), &public)
                .context("encrypting message")?;
            println!("ciphertext: {}", hex::encode(&ciphertext));

            let decrypted = cipher
                .decrypt(&ciphertext, &private)
                .context("decrypting message")?;
            println!("decrypted: {}", String::from_utf8_lossy(&decrypted));
            ensure!(decrypted == message.as_bytes(), "decryption did not round-trip");

            let signature = cipher
                .sign(message.as_bytes(), &private)
                .context("signing message")?;
            println!("signature: {}", hex::encode(&signature));

            let recovered = cipher
                .verify(&signature, &public)
                .context("verifying signature")?;
            ensure!(recovered == message.as_bytes(), "signature did not verify");
            println!("signature verified");
        }
    }

    Ok(())
}
