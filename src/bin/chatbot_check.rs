use std::env;
use std::time::Instant;
use vecinal::{ChatbotClient, Settings};

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: chatbot_check <comunidad_id> <question>");
        std::process::exit(2);
    }

    let settings = Settings::load();
    println!("Endpoint: {}", settings.api_base_url);

    let client = ChatbotClient::new(settings.api_base_url.clone());
    let t0 = Instant::now();
    match client.ask(&args[1], &args[2]).await {
        Ok(answer) => {
            println!("Answer: {}", answer.answer);
            if let Some(source) = &answer.source {
                println!(
                    "Source: type={}, reference={}",
                    source.kind,
                    source.reference.as_deref().unwrap_or("-")
                );
            }
            if let Some(disclaimer) = &answer.disclaimer {
                println!("Disclaimer: {}", disclaimer);
            }
            println!("wall_time={:.2}s", t0.elapsed().as_secs_f64());
        }
        Err(e) => {
            eprintln!("Chatbot request refused: {}", e);
            std::process::exit(3);
        }
    }
}
