use clap::{Args, ValueEnum};
use termodoro_core::timer::plan;
use termodoro_core::{Config, TimerMode, TimerSettings, Transition};

#[derive(Clone, Copy, ValueEnum)]
pub enum StartMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl From<StartMode> for TimerMode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Work => TimerMode::Work,
            StartMode::ShortBreak => TimerMode::ShortBreak,
            StartMode::LongBreak => TimerMode::LongBreak,
        }
    }
}

#[derive(Args)]
pub struct PlanArgs {
    /// Number of sessions to show
    #[arg(long, default_value_t = 8)]
    count: usize,
    /// Work sessions already completed
    #[arg(long, default_value_t = 0)]
    completed: u32,
    /// Session the sequence starts after
    #[arg(long, value_enum, default_value = "work")]
    from: StartMode,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let settings = config.timer_settings();
    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "configured timer settings are invalid");
    }
    let steps = plan(&settings, args.from.into(), args.completed, args.count);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }
    for line in render(&steps, &settings) {
        println!("{line}");
    }
    Ok(())
}

fn render(steps: &[Transition], settings: &TimerSettings) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            format!(
                "{:>3}  {:<11}  {:02}:{:02}  {}/{}",
                i + 1,
                step.mode.as_str(),
                step.duration / 60,
                step.duration % 60,
                step.completed_pomodoros,
                settings.pomodoros_until_long_break,
            )
        })
        .collect()
}
