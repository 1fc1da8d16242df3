use anyhow::Result;
use clap::Parser;
use data_assistant::answer::Answer;
use data_assistant::config::ApiConfig;
use data_assistant::dataset::Dataset;
use data_assistant::dispatcher::{QueryDispatcher, DEFAULT_CHUNK_SIZE};
use data_assistant::llm::LlmClient;
use data_assistant::profile::DatasetProfile;
use data_assistant::table_qa::HostedTableQa;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "data-assistant")]
#[command(about = "Ask natural-language questions about a tabular dataset")]
struct Args {
    /// The question to ask about the dataset
    question: Option<String>,

    /// Path to the CSV dataset
    #[arg(short, long)]
    data: PathBuf,

    /// Print an overview of the dataset and exit
    #[arg(long)]
    describe: bool,

    /// Send the question to the hosted chat model instead of the
    /// dispatcher
    #[arg(long)]
    insight: bool,

    /// Chat API key (or set CLAUDE_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Token for the hosted table-QA endpoint (or set HF_API_TOKEN)
    #[arg(long)]
    qa_token: Option<String>,

    /// Maximum rows per table-QA chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = ApiConfig::from_env();

    let dataset = Dataset::from_csv_path(&args.data)?;
    info!(
        rows = dataset.height(),
        columns = dataset.width(),
        "loaded dataset from {}",
        args.data.display()
    );

    if args.describe {
        let profile = DatasetProfile::build(&dataset)?;
        print!("{}", profile.render());
        return Ok(());
    }

    let question = args
        .question
        .ok_or_else(|| anyhow::anyhow!("no question provided (pass one, or use --describe)"))?;

    if args.insight {
        let api_key = args
            .api_key
            .or(config.chat_api_key)
            .ok_or_else(|| anyhow::anyhow!("no chat API key; set CLAUDE_API_KEY or pass --api-key"))?;
        let llm = LlmClient::new(api_key);
        let answer = llm.ask_about_dataset(&question, &dataset).await?;
        println!("{}", answer);
        return Ok(());
    }

    let qa_token = args.qa_token.or(config.table_qa_token).unwrap_or_default();
    let dispatcher = QueryDispatcher::new(Arc::new(HostedTableQa::new(qa_token)))
        .with_chunk_size(args.chunk_size);

    match dispatcher.dispatch(&question, &dataset).await? {
        None => println!("Please enter a valid question."),
        Some(answer) => print_answer(&answer),
    }

    Ok(())
}

fn print_answer(answer: &Answer) {
    match answer {
        Answer::Text { content } => println!("{}", content),
        Answer::Direct { content, total } => {
            println!("Found {} unique answers:", total);
            println!("{}", content);
        }
        Answer::Paginated { total, .. } => {
            println!("Found {} unique answers", total);
            if let Some(page) = answer.page(0) {
                for item in page {
                    println!("• {}", item);
                }
                println!("Showing 1-{} of {} items", page.len(), total);
            }
        }
    }
}
