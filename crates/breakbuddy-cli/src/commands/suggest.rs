use breakbuddy_core::suggestion::{GeminiClient, SuggestionGenerator, SuggestionRequest};
use breakbuddy_core::{Config, Mood};

pub fn run(minutes: u32, mood: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mood = mood.map(str::parse::<Mood>).transpose()?;
    let config = Config::load()?;
    let client = GeminiClient::from_config(&config.suggestions);
    let request = SuggestionRequest::from_focus_seconds(u64::from(minutes) * 60, mood);

    let runtime = tokio::runtime::Runtime::new()?;
    let text = runtime.block_on(client.generate(&request))?;
    println!("{text}");
    Ok(())
}
