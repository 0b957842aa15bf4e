use anyhow::Result;
use clap::Parser;
use git_storyid::App;
use git_storyid::commands::commit::CommitRequest;
use git_storyid::config::ConfigPaths;
use git_storyid::config::ConfigStore;
use git_storyid::logging::setup_logging;
use git_storyid::ops::git::RealGit;
use git_storyid::ops::tracker::PivotalTracker;
use git_storyid::prompt::TerminalReader;

#[derive(Parser)]
#[command(name = "git-storyid", version)]
#[command(about = "Do git commit with information from pivotal story", long_about = None)]
pub struct Cli {
    /// Add additional MESSAGE to commit
    #[arg(short = 'm', value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Story IDs to reference (select interactively when omitted)
    pub stories: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        println!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    setup_logging()?;

    let paths = ConfigPaths::from_env()?;
    let mut app = App::new(
        RealGit::new(paths.cwd.clone()),
        TerminalReader,
        ConfigStore::new(paths),
    );

    let request = CommitRequest {
        note: cli.message,
        stories: cli.stories,
    };
    app.cmd_commit(&request, PivotalTracker::new, &mut std::io::stdout())
        .await
}
