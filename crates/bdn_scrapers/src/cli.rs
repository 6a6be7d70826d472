use clap::{Args, Subcommand};
use bdn_core::Result;
use crate::manager::ScraperManager;

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: Option<ScraperCommands>,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Scrape one source and save it as today's batch, replacing any batch
    /// already written today (including a full scrape)
    Source {
        /// CLI name of the source (e.g. dailystar, prothomalo) or `all`
        name: String,
    },
    /// List available scrapers
    List,
    /// Scrape a single article and print it as JSON
    Url {
        url: String,
    },
}

/// Runs a scrape subcommand. Without a subcommand every source is scraped.
pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<()> {
    match args.command {
        None => report_batch(manager.scrape_and_save(&manager.get_scrapers()).await?),
        Some(ScraperCommands::Source { name }) => {
            let scrapers = manager.get_scrapers_for_source(&name)?;
            report_batch(manager.scrape_and_save(&scrapers).await?)
        }
        Some(ScraperCommands::List) => {
            println!("Available scrapers:");
            for line in manager.list_scrapers() {
                println!("  {}", line);
            }
        }
        Some(ScraperCommands::Url { url }) => {
            let article = manager.scrape_url(&url).await?;
            println!("{}", serde_json::to_string_pretty(&article)?);
        }
    }
    Ok(())
}

fn report_batch(path: Option<std::path::PathBuf>) {
    match path {
        Some(path) => println!("✅ Saved batch to {}", path.display()),
        None => println!("⚠️ No articles were scraped."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ScraperArgs,
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = TestCli::parse_from(["bdn", "source", "dailystar"]);
        assert!(matches!(cli.args.command, Some(ScraperCommands::Source { ref name }) if name == "dailystar"));

        let cli = TestCli::parse_from(["bdn", "list"]);
        assert!(matches!(cli.args.command, Some(ScraperCommands::List)));

        let cli = TestCli::parse_from(["bdn"]);
        assert!(cli.args.command.is_none());
    }

    #[test]
    fn test_source_help_warns_about_replacing_todays_batch() {
        let command = TestCli::command();
        let about = command
            .find_subcommand("source")
            .and_then(|source| source.get_about())
            .map(|about| about.to_string())
            .unwrap_or_default();
        assert!(about.contains("replacing any batch"));
        assert!(about.contains("already written today"));
    }
}
