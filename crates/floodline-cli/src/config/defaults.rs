pub struct DefaultsConfig {
    pub scenario: String,
    pub worst_case_scenario: String,
    pub narrative_enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub api_key_env: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            scenario: "1.0 - HIGH".to_string(),
            worst_case_scenario: "1.0 - HIGH".to_string(),
            narrative_enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 1.0,
            max_tokens: 600,
            timeout_secs: 10,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}
