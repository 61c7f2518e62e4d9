//! Search and interactive subcommand handlers.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use kbsearch_protocols::{SearchError, SearchMode, SearchResult};
use kbsearch_search_hybrid::{KnowledgeBase, SearchRequest};

fn print_separator(ch: char) {
    println!("{}", ch.to_string().repeat(80));
}

fn parse_mode(kb: &KnowledgeBase, search_type: Option<&str>) -> Result<SearchMode> {
    match search_type {
        Some(search_type) => Ok(search_type.parse()?),
        None => Ok(kb.config().default_mode),
    }
}

fn print_result(result: &SearchResult, index: usize) {
    println!("\n{}. {}", index, result.document_title);
    println!("   Similarity Score: {:.4}", result.score);
    println!("   Source: {}", result.document_source);
    println!("   Document ID: {}", result.document_id);
    println!("   Chunk ID: {}", result.chunk_id);

    println!("\n   Content:");
    for line in result.content.lines() {
        println!("   {}", line);
    }

    if !result.metadata.is_empty() {
        let metadata = serde_json::to_string(&result.metadata).unwrap_or_default();
        println!("\n   Metadata: {}", metadata);
    }
}

/// Handle `kbsearch search`.
pub(crate) async fn handle_search(
    kb: &KnowledgeBase,
    query: &str,
    count: Option<usize>,
    search_type: Option<String>,
    transcript: bool,
) -> Result<()> {
    if transcript {
        let mut request = SearchRequest::new(query);
        if let Some(count) = count {
            request = request.with_match_count(i64::try_from(count)?);
        }
        if let Some(search_type) = search_type {
            request = request.with_search_type(search_type);
        }

        match kb.search_knowledge_base(request).await {
            Ok(text) => println!("{}", text),
            Err(SearchError::Validation(e)) => println!("{}", e.guidance()),
        }
        return Ok(());
    }

    let mode = parse_mode(kb, search_type.as_deref())?;
    let count = count.unwrap_or(kb.config().default_match_count);
    run_query(kb, query, count, mode).await
}

async fn run_query(kb: &KnowledgeBase, query: &str, count: usize, mode: SearchMode) -> Result<()> {
    println!("\nExecuting {} search...", mode.as_str().to_uppercase());
    println!("Query: '{}'", query);
    println!("Requested results: {}", count);
    print_separator('-');

    let outcome = kb.search_detailed(query, count, mode).await?;

    for report in &outcome.branches {
        match report.outcome.failure() {
            Some(kind) => println!("! {} branch degraded ({})", report.branch, kind),
            None => debug!("{} branch took {:?}", report.branch, report.elapsed),
        }
    }

    let results = &outcome.results;
    if results.is_empty() {
        println!("\nNo results found!");
        return Ok(());
    }

    println!("\nFound {} results:\n", results.len());
    print_separator('=');
    for (i, result) in results.iter().enumerate() {
        print_result(result, i + 1);
        if i + 1 < results.len() {
            print_separator('-');
        }
    }
    print_separator('=');

    let average = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;
    println!("\nSummary:");
    println!("  Results: {}", results.len());
    println!("  Average Score: {:.4}", average);
    println!("  Top Score: {:.4}", results[0].score);
    println!("  Lowest Score: {:.4}", results[results.len() - 1].score);
    Ok(())
}

fn help_text() -> String {
    [
        "",
        "Options:",
        "  /count <n>     - Set number of results",
        "  /type <mode>   - Set search type (hybrid, semantic, text)",
        "  /settings      - Show current settings",
        "  /quit          - Exit the tool",
        "",
        "Example queries:",
        "  How do I configure the embedding provider?",
        "  What does degraded mode mean?",
        "  installation steps",
    ]
    .join("\n")
}

fn print_help() {
    println!("{}", help_text());
}

/// Handle `kbsearch interactive`.
pub(crate) async fn handle_interactive(
    kb: &KnowledgeBase,
    count: Option<usize>,
    search_type: Option<String>,
) -> Result<()> {
    let mut mode = parse_mode(kb, search_type.as_deref())?;
    let mut count = count.unwrap_or(kb.config().default_match_count);

    print_separator('=');
    println!("kbsearch - Interactive Mode");
    print_separator('=');
    println!("\nEnter a query to search, /help for options, /quit to stop.");
    print_separator('=');

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        match parts.next() {
            Some("/quit") | Some("quit") | Some("exit") => break,
            Some("/help") | Some("help") => print_help(),
            Some("/settings") => {
                println!("\nCurrent Settings:");
                println!("  Search Type: {}", mode);
                println!("  Result Count: {}", count);
            }
            Some("/count") => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n > 0 => {
                    count = n;
                    println!("Result count set to {}", count);
                }
                _ => println!("Invalid count. Usage: /count <number>"),
            },
            Some("/type") => match parts.next().map(str::parse::<SearchMode>) {
                Some(Ok(parsed)) => {
                    mode = parsed;
                    println!("Search type set to {}", mode);
                }
                Some(Err(_)) => println!("Invalid type. Use: hybrid, semantic, or text"),
                None => println!("Invalid type. Usage: /type <hybrid|semantic|text>"),
            },
            _ => {
                if let Err(e) = run_query(kb, input, count, mode).await {
                    println!("\nError: {}", e);
                }
            }
        }
    }

    println!("\nExiting...");
    Ok(())
}
