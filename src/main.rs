use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use woundwise_lib::config::EngineConfig;
use woundwise_lib::models::{AssessmentResult, PatientProfile};
use woundwise_lib::pipeline::assessment::{
    build_assessment_prompt, run_demo_assessment, AssessmentEngine, SourceImage,
};

#[derive(Parser)]
#[command(name = "woundwise")]
#[command(version, about = "Wound photo triage from an image and a health profile")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a wound photo
    Assess {
        /// Image file (JPEG, PNG, WebP, ...)
        image: PathBuf,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Produce a demonstration result without analysing any image
    Demo {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Seed for a reproducible archetype pick
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the instruction text that would accompany the image
    Prompt {
        #[command(flatten)]
        profile: ProfileArgs,
    },
}

#[derive(Args)]
struct ProfileArgs {
    /// Patient age in years
    #[arg(long)]
    age: u32,
    /// Patient has high blood pressure
    #[arg(long)]
    high_bp: bool,
    /// Patient has diabetes
    #[arg(long)]
    diabetes: bool,
    /// Current medications, free text
    #[arg(long, default_value = "")]
    medications: String,
}

impl ProfileArgs {
    fn into_profile(self) -> Result<PatientProfile, Box<dyn std::error::Error>> {
        Ok(PatientProfile::new(
            self.age,
            self.high_bp,
            self.diabetes,
            self.medications,
        )?)
    }
}

fn print_result(result: &AssessmentResult) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    woundwise_lib::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess { image, profile } => {
            let profile = profile.into_profile()?;
            let config = EngineConfig::from_env()?;
            let engine = AssessmentEngine::from_config(&config)?;
            let source = SourceImage::from_path(&image)?;
            print_result(&engine.assess(&source, &profile))?;
        }
        Commands::Demo { profile, seed } => {
            let profile = profile.into_profile()?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            print_result(&run_demo_assessment(&profile, &mut rng))?;
        }
        Commands::Prompt { profile } => {
            println!("{}", build_assessment_prompt(&profile.into_profile()?));
        }
    }

    Ok(())
}
