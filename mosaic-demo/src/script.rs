use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use mosaic_canvas::{CanvasConfig, ImageSize, Portfolio, PortfolioItem, StaticDimensionLoader};
use serde::Deserialize;

/// Contents of the demo TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DemoFile {
    /// Canvas knobs; anything left out keeps its default.
    pub canvas: CanvasConfig,
    /// Known image sizes as `url = [width, height]`, loaded in the
    /// background when no uploads directory is given.
    pub sizes: BTreeMap<String, [u32; 2]>,
    /// The session to replay. Empty means [`default_steps`].
    #[serde(rename = "step")]
    pub steps: Vec<Step>,
}

impl DemoFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn size_loader(&self) -> StaticDimensionLoader {
        self.sizes
            .iter()
            .fold(StaticDimensionLoader::new(), |loader, (url, [w, h])| {
                loader.with(url.clone(), ImageSize::new(*w, *h))
            })
    }

    pub fn steps(&self) -> Vec<Step> {
        if self.steps.is_empty() {
            default_steps()
        } else {
            self.steps.clone()
        }
    }
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Press in the middle of the viewport, move by `(dx, dy)` in `moves`
    /// pointer events within one frame, release.
    Drag {
        dx: i32,
        dy: i32,
        #[serde(default = "default_moves")]
        moves: u32,
    },
    /// One wheel event.
    Wheel {
        dx: f32,
        dy: f32,
        #[serde(default)]
        lines: bool,
    },
    /// Resize the viewport.
    Resize { width: i32, height: i32 },
    /// Report the rendered height of a visible cell.
    ReportHeight {
        column: i32,
        ordinal: i32,
        height: i32,
    },
}

fn default_moves() -> u32 {
    4
}

/// Drag a screen to the right, scroll down, then drag far up and left.
pub fn default_steps() -> Vec<Step> {
    vec![
        Step::Drag {
            dx: 1000,
            dy: 0,
            moves: default_moves(),
        },
        Step::Wheel {
            dx: 0.0,
            dy: 600.0,
            lines: false,
        },
        Step::ReportHeight {
            column: -3,
            ordinal: 1,
            height: 420,
        },
        Step::Drag {
            dx: -2400,
            dy: 900,
            moves: default_moves(),
        },
    ]
}

pub fn load_portfolio(path: &Path) -> Result<Portfolio> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let items: Vec<PortfolioItem> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse portfolio {}", path.display()))?;
    Ok(Portfolio::new(items))
}

#[cfg(test)]
mod tests {
    use mosaic_ui::Px;

    use super::*;

    #[test]
    fn parses_canvas_sizes_and_steps() {
        let file: DemoFile = toml::from_str(
            r#"
            [canvas]
            card_width = 200
            gap = 20

            [sizes]
            "/uploads/a.jpg" = [400, 500]

            [[step]]
            kind = "drag"
            dx = 100
            dy = -50

            [[step]]
            kind = "wheel"
            dx = 0.0
            dy = 3.0
            lines = true
            "#,
        )
        .expect("valid demo file");

        assert_eq!(file.canvas.card_width, Px(200));
        assert_eq!(file.canvas.column_width(), Px(220));
        assert_eq!(file.canvas.stagger_offset, Px(120));
        assert_eq!(file.sizes.len(), 1);
        assert_eq!(
            file.steps,
            vec![
                Step::Drag {
                    dx: 100,
                    dy: -50,
                    moves: 4
                },
                Step::Wheel {
                    dx: 0.0,
                    dy: 3.0,
                    lines: true
                },
            ]
        );
    }

    #[test]
    fn empty_file_uses_default_session() {
        let file: DemoFile = toml::from_str("").expect("empty demo file");
        assert_eq!(file.canvas, CanvasConfig::default());
        assert_eq!(file.steps(), default_steps());
    }

    #[test]
    fn portfolio_items_use_camel_case() {
        let items: Vec<PortfolioItem> = serde_json::from_str(
            r#"[{"id": "1", "images": ["/uploads/1.jpg"], "createdBy": "Ana", "year": "2023"}]"#,
        )
        .expect("valid portfolio");
        assert_eq!(items[0].created_by, "Ana");
        assert_eq!(items[0].cover_image(), Some("/uploads/1.jpg"));
    }
}
