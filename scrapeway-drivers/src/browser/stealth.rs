use super::driver::LaunchOptions;

/// Construct Chrome command-line arguments for a scrape session.
pub fn build_launch_arguments(options: &LaunchOptions) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-extensions".to_string(),
        format!(
            "--window-size={},{}",
            options.window_size.0, options.window_size.1
        ),
        "--lang=en-US,en".to_string(),
    ];
    if options.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    if let Some(agent) = &options.user_agent {
        args.push(format!("--user-agent={agent}"));
    }
    if let Some(proxy) = &options.proxy_url {
        args.push(format!("--proxy-server={proxy}"));
    }
    args
}

/// JavaScript evasions applied after each navigation to reduce automation signals.
pub struct StealthScripts;

impl StealthScripts {
    pub fn get_core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en']
            });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> LaunchOptions {
        LaunchOptions::default()
    }

    #[test]
    fn headless_flags_follow_option() {
        let args = build_launch_arguments(&options());
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));

        let headed = LaunchOptions {
            headless: false,
            ..options()
        };
        let args = build_launch_arguments(&headed);
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn proxy_is_only_added_when_configured() {
        let args = build_launch_arguments(&options());
        assert!(!args.iter().any(|a| a.starts_with("--proxy-server")));

        let proxied = LaunchOptions {
            proxy_url: Some("http://u:p@proxy.local:8080".into()),
            ..options()
        };
        let args = build_launch_arguments(&proxied);
        assert!(args.contains(&"--proxy-server=http://u:p@proxy.local:8080".to_string()));
    }

    #[test]
    fn window_size_and_user_agent() {
        let custom = LaunchOptions {
            user_agent: Some("TestAgent/1.0".into()),
            window_size: (800, 600),
            ..options()
        };
        let args = build_launch_arguments(&custom);
        assert!(args.contains(&"--window-size=800,600".to_string()));
        assert!(args.contains(&"--user-agent=TestAgent/1.0".to_string()));
    }
}
