use anyhow::{anyhow, bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemoOptions {
    pub config: Option<String>,
    pub script: Option<String>,
    pub ticks: Option<u32>,
}

impl DemoOptions {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = DemoOptions::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --config/--script/--ticks with values.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => options.config = Some(value),
                "script" => options.script = Some(value),
                "ticks" => {
                    options.ticks =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid tick count '{value}'"))?);
                }
                _ => bail!("Unknown flag '{flag}'. Supported flags: --config, --script, --ticks."),
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = ["demo", "--config", "sim.json", "--script", "volley.rhai", "--ticks", "600"];
        let options = DemoOptions::parse(args).expect("parse options");
        assert_eq!(options.config.as_deref(), Some("sim.json"));
        assert_eq!(options.script.as_deref(), Some("volley.rhai"));
        assert_eq!(options.ticks, Some(600));
    }

    #[test]
    fn rejects_unknown_flag() {
        let args = ["demo", "--frobnicate", "1"];
        assert!(DemoOptions::parse(args).is_err());
    }

    #[test]
    fn rejects_missing_value() {
        let args = ["demo", "--ticks"];
        assert!(DemoOptions::parse(args).is_err());
    }

    #[test]
    fn rejects_bad_tick_count() {
        let args = ["demo", "--ticks", "soon"];
        assert!(DemoOptions::parse(args).is_err());
    }
}
