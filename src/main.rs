use clap::Parser;
use cryptkit::cli::{load_settings, Cli, Commands};

fn main() {
    cryptkit::logging::init();

    let cli = Cli::parse();

    // Load defaults early so a broken config file is reported once.
    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            cryptkit::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Prng {
            ref kind,
            size,
            min,
            max,
            ref encoding,
        } => cryptkit::cli::commands::prng::execute(
            &cli,
            &settings,
            kind,
            size,
            min,
            max,
            encoding.as_deref(),
        ),
        Commands::Scrypt {
            ref password,
            ref salt,
            ref salt_encoding,
            key_size,
            ref encoding,
        } => cryptkit::cli::commands::scrypt::execute(
            &cli,
            &settings,
            password.as_deref(),
            salt.as_deref(),
            salt_encoding,
            key_size,
            encoding.as_deref(),
        ),
        Commands::Cipher(ref args) => cryptkit::cli::commands::cipher::execute(&cli, &settings, args),
        Commands::Decipher(ref args) => {
            cryptkit::cli::commands::decipher::execute(&cli, &settings, args)
        }
        Commands::Hash {
            ref algorithm,
            ref input,
            ref encoding,
        } => cryptkit::cli::commands::hash::execute(
            &cli,
            &settings,
            algorithm.as_deref(),
            input,
            encoding.as_deref(),
        ),
        Commands::Hmac {
            ref algorithm,
            ref key,
            ref input,
            ref encoding,
        } => cryptkit::cli::commands::hmac::execute(
            &cli,
            &settings,
            algorithm.as_deref(),
            key,
            input,
            encoding.as_deref(),
        ),
        Commands::DiffieHellman(ref args) => {
            cryptkit::cli::commands::diffie_hellman::execute(&cli, &settings, args)
        }
    };

    if let Err(e) = result {
        cryptkit::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
