//! Tailwind configuration handling

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::error::{Result, ShadError};

/// Content glob of the Redwood web side
pub const CONTENT_GLOB: &str = "src/**/*.{js,jsx,ts,tsx}";

/// Config written by `yarn rw setup ui tailwind`
pub const STOCK_CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
module.exports = {
  content: ['src/**/*.{js,jsx,ts,tsx}'],
  theme: {
    extend: {},
  },
  plugins: [],
}
"#;

const HEADER: &str = "const { fontFamily } = require('tailwindcss/defaultTheme')\n\n\
                      /** @type {import('tailwindcss').Config} */\n\
                      module.exports = ";

const FONT_FAMILY_PLACEHOLDER: &str = "%FONT_FAMILY_SANS%";
const TW_ANIMATE_PLACEHOLDER: &str = "%REQUIRE_TW_ANIMATE%";

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",([}\]])").expect("static regex is valid"));

/// Whether `source` is the stock Redwood Tailwind config
///
/// Comments, whitespace, quote style, trailing commas and a trailing
/// semicolon are ignored.
pub fn is_stock_config(source: &str) -> bool {
    normalize(source) == normalize(STOCK_CONFIG)
}

/// Render the rw-shad Tailwind config, keys sorted
pub fn render_config() -> Result<String> {
    let color = |name: &str| format!("hsl(var(--{name}))");
    let pair = |name: &str| {
        json!({
            "DEFAULT": color(name),
            "foreground": color(&format!("{name}-foreground")),
        })
    };

    let config = json!({
        "content": [CONTENT_GLOB],
        "darkMode": "class",
        "plugins": [TW_ANIMATE_PLACEHOLDER],
        "theme": {
            "container": {
                "center": true,
                "padding": "2rem",
                "screens": { "2xl": "1440px" },
            },
            "extend": {
                "animation": {
                    "accordion-down": "accordion-down 0.2s ease-out",
                    "accordion-up": "accordion-up 0.2s ease-out",
                },
                "borderRadius": {
                    "lg": "var(--radius)",
                    "md": "calc(var(--radius) - 2px)",
                    "sm": "calc(var(--radius) - 4px)",
                },
                "colors": {
                    "border": color("border"),
                    "input": color("input"),
                    "ring": color("ring"),
                    "background": color("background"),
                    "foreground": color("foreground"),
                    "primary": pair("primary"),
                    "secondary": pair("secondary"),
                    "destructive": pair("destructive"),
                    "muted": pair("muted"),
                    "accent": pair("accent"),
                    "popover": pair("popover"),
                    "card": pair("card"),
                },
                "fontFamily": { "sans": [FONT_FAMILY_PLACEHOLDER] },
                "keyframes": {
                    "accordion-down": {
                        "from": { "height": "0" },
                        "to": { "height": "var(--radix-accordion-content-height)" },
                    },
                    "accordion-up": {
                        "from": { "height": "var(--radix-accordion-content-height)" },
                        "to": { "height": "0" },
                    },
                },
            },
        },
    });

    let body = serde_json::to_string_pretty(&config)
        .map_err(|e| ShadError::file(format!("Failed to render Tailwind config: {e}")))?;

    Ok(format!("{HEADER}{body}\n")
        .replace(
            &format!("\"{FONT_FAMILY_PLACEHOLDER}\""),
            "...fontFamily.sans",
        )
        .replace(
            &format!("\"{TW_ANIMATE_PLACEHOLDER}\""),
            "require('tailwindcss-animate')",
        ))
}

/// Reduce JavaScript source to a comparable form
///
/// Drops comments and whitespace outside string literals and rewrites every
/// string literal with single quotes.
fn normalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push('\'');
                while let Some(inner) = chars.next() {
                    if inner == c {
                        break;
                    }
                    if inner == '\\' {
                        out.push(inner);
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                        continue;
                    }
                    out.push(inner);
                }
                out.push('\'');
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }

    let out = TRAILING_COMMA.replace_all(&out, "$1");
    out.trim_end_matches(';').to_string()
}
