//! Line-based control console

use anyhow::{anyhow, bail, Result};
use isolator_core::ParamId;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `<param_key> <value>`, e.g. `mid_gain -6` or `low_bypass on`
    Set(ParamId, f32),
    /// Print the current state document
    State,
    /// Print peak meters
    Levels,
    /// Save settings to the config directory
    Save,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(None);
    };

    let command = match first {
        "state" => Command::State,
        "levels" => Command::Levels,
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        key => {
            let id = ParamId::from_key(key).ok_or_else(|| anyhow!("unknown command '{}'", key))?;
            let raw = words
                .next()
                .ok_or_else(|| anyhow!("missing value for '{}'", key))?;
            let value = if id.is_bypass() {
                parse_switch(raw)?
            } else {
                raw.parse::<f32>()
                    .map_err(|_| anyhow!("'{}' is not a gain in dB", raw))?
            };
            Command::Set(id, value)
        }
    };

    if let Some(extra) = words.next() {
        bail!("unexpected argument '{}'", extra);
    }
    Ok(Some(command))
}

fn parse_switch(raw: &str) -> Result<f32> {
    match raw {
        "on" | "true" | "1" => Ok(1.0),
        "off" | "false" | "0" => Ok(0.0),
        _ => bail!("'{}' is not on/off", raw),
    }
}

pub fn help() -> String {
    let mut text = String::from("Commands:\n");
    for id in ParamId::ALL {
        let hint = if id.is_bypass() { "on|off" } else { "<dB>" };
        text.push_str(&format!("  {:<14} {:<7} {}\n", id.key(), hint, id.display_name()));
    }
    text.push_str("  state                  print the current state\n");
    text.push_str("  levels                 print peak levels\n");
    text.push_str("  save                   save settings\n");
    text.push_str("  quit                   stop and exit");
    text
}
