use clap::Subcommand;
use tempoplan_core::{Config, Database, LearningModel, LearningRecord, MoodType};

#[derive(Subcommand)]
pub enum LearnAction {
    /// Show learned completion ratios and load multipliers
    Show {
        /// Limit to one mood
        #[arg(long)]
        mood: Option<MoodType>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a closed day
    Record {
        #[arg(long)]
        mood: MoodType,
        /// Minutes that were planned
        #[arg(long)]
        assigned: u32,
        /// Minutes that were actually completed
        #[arg(long)]
        completed: u32,
    },
    /// Forget all learned history
    Reset,
}

pub fn run(action: LearnAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let model = LearningModel::with_config(Database::open()?, config.learning)?;

    match action {
        LearnAction::Show { mood, json } => {
            let records: Vec<LearningRecord> = model
                .snapshot()?
                .into_iter()
                .filter(|r| mood.map_or(true, |m| r.mood == m))
                .collect();

            if json {
                let rows: Vec<serde_json::Value> = records
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "mood": r.mood,
                            "sample_count": r.sample_count,
                            "average_completion_ratio": r.average_completion_ratio,
                            "updated_at": r.updated_at,
                            "load_multiplier": model.calculate_adjusted_load(r.mood),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for r in &records {
                    println!(
                        "{:<10} samples {:>4}  avg {:.2}  load x{:.2}",
                        r.mood.as_str(),
                        r.sample_count,
                        r.average_completion_ratio,
                        model.calculate_adjusted_load(r.mood)
                    );
                }
            }
        }
        LearnAction::Record {
            mood,
            assigned,
            completed,
        } => match model.record_day_stats(mood, assigned, completed)? {
            Some(record) => println!(
                "recorded {mood}: samples {}, avg {:.2}, load x{:.2}",
                record.sample_count,
                record.average_completion_ratio,
                model.calculate_adjusted_load(mood)
            ),
            None => println!("nothing assigned, day not recorded"),
        },
        LearnAction::Reset => {
            model.reset()?;
            println!("learning history cleared");
        }
    }
    Ok(())
}
