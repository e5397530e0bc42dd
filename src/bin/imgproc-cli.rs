use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "imgproc-cli")]
#[command(about = "Client CLI for the image processing service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the liveness probe
    Health,
    /// Call the diagnostic test endpoint
    Ping,
    /// Upload a file and save the processed attachment
    Upload {
        /// File to upload
        file: PathBuf,

        /// Multipart field name
        #[arg(long, default_value = "image")]
        field: String,

        /// Upload route
        #[arg(long, default_value = "/api/v1/image")]
        route: String,

        /// Where to write the result (defaults to the server-provided name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Ping => {
            let res = client.get(format!("{}/api/v1/test", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Upload {
            file,
            field,
            route,
            out,
        } => {
            let bytes = tokio::fs::read(&file).await?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();

            let form = Form::new().part(field, Part::bytes(bytes).file_name(name));
            let res = client
                .post(format!("{}{}", base, route))
                .multipart(form)
                .send()
                .await?;

            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: service returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                return Err(format!("upload failed with status {}", status).into());
            }

            let suggested = res
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
                .and_then(attachment_name);
            let target = out
                .or_else(|| suggested.as_deref().and_then(safe_basename))
                .unwrap_or_else(|| PathBuf::from("processed_output"));

            let body = res.bytes().await?;
            tokio::fs::write(&target, &body).await?;
            println!("Wrote {} bytes to {}", body.len(), target.display());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Filename from `attachment; filename="..."`, with quoted-string escapes undone.
fn attachment_name(disposition: &str) -> Option<String> {
    let start = disposition.find("filename=\"")? + "filename=\"".len();
    let mut name = String::new();
    let mut chars = disposition[start..].chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => name.push(chars.next()?),
            '"' => return Some(name),
            other => name.push(other),
        }
    }
    None
}

/// Last path component only; the server echoes client names verbatim.
fn safe_basename(name: &str) -> Option<PathBuf> {
    let last = name.rsplit(['/', '\\']).next()?;
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Path::new(last).file_name().map(PathBuf::from)
}
