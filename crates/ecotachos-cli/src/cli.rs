//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ecotachos", version, about = "EcoTachos waste classification client")]
pub struct Cli {
    /// Backend base URL, overrides API_BASE_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ECOTACHOS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Exchange a Google ID token for a session
    GoogleLogin {
        #[arg(long, env = "GOOGLE_ID_TOKEN", hide_env_values = true)]
        id_token: String,
    },
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Classify an image file
    Classify(ClassifyArgs),
    /// Inference engine status
    AiHealth,
    /// Bins visible to the user
    Tachos {
        #[arg(long)]
        json: bool,
    },
    /// Admin dashboard totals
    Stats,
    /// Detection counts and average confidence
    DetectionsStats,
    /// Serverless logger status
    ServerlessHealth,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Image to classify (JPG, PNG, WebP...)
    pub path: PathBuf,

    /// Attempts for the inference call
    #[arg(long)]
    pub retries: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the classification as a detection record
    #[arg(long)]
    pub save: bool,

    /// Bin the detection belongs to, required when the user owns bins
    #[arg(long, requires = "save")]
    pub tacho: Option<i64>,

    /// Also send the result to the serverless logger
    #[arg(long)]
    pub log_serverless: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify() {
        let cli = Cli::try_parse_from([
            "ecotachos",
            "classify",
            "foto.jpg",
            "--retries",
            "5",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Classify(args) => {
                assert_eq!(args.path, PathBuf::from("foto.jpg"));
                assert_eq!(args.retries, Some(5));
                assert!(args.json);
                assert!(!args.save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_tacho_requires_save() {
        assert!(Cli::try_parse_from(["ecotachos", "classify", "a.jpg", "--tacho", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["ecotachos", "classify", "a.jpg", "--save", "--tacho", "3"]).is_ok()
        );
    }

    #[test]
    fn test_global_api_url() {
        let cli = Cli::try_parse_from(["ecotachos", "ai-health", "--api-url", "http://x/api"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x/api"));
        assert!(matches!(cli.command, Command::AiHealth));
    }

    #[test]
    fn test_command_names() {
        for name in ["logout", "whoami", "stats", "detections-stats", "serverless-health"] {
            assert!(Cli::try_parse_from(["ecotachos", name]).is_ok(), "{}", name);
        }
    }
}
