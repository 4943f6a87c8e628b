//! Scene rendering: metrics, image resolution, layout, and painting.

use crate::adjustment::{HeightAdjustment, IdentityAdjustment};
use crate::character::{Character, RenderOptions};
use crate::color::{apply_tint, dominant_color};
use crate::error::{SizeDiffError, SizeDiffResult};
use crate::geometry::{grid_lines, height_indicator};
use crate::image_loading::{ImageLoadError, ImageProvider};
use crate::layout::{compute_layout, ImageSize, LayoutResult};
use crate::metrics::compute_metrics;
use crate::surface::CanvasSurface;
use crate::units::inches_to_feet_inches;
use base64::Engine;
use size_diff_canvas2d::{Canvas2dContext, CanvasImage, FontConfig, ResolvedFontConfig};
use std::sync::Arc;

lazy_static! {
    static ref DEFAULT_FONTS: ResolvedFontConfig = FontConfig::default().resolve();
}

/// A canvas with system fonts, scanned once per process.
pub fn default_canvas() -> SizeDiffResult<Canvas2dContext> {
    Ok(Canvas2dContext::with_resolved(1, 1, &DEFAULT_FONTS)?)
}

/// The two label lines under a character's name: height and species.
pub fn label_lines(character: &Character, adjusted_height: f64) -> [String; 2] {
    [
        inches_to_feet_inches(adjusted_height),
        character.species_label(),
    ]
}

fn asset_error(index: usize, err: ImageLoadError) -> SizeDiffError {
    SizeDiffError::AssetResolution {
        index,
        path: err.path().to_string(),
        reason: err.to_string(),
    }
}

struct PreparedScene {
    layout: LayoutResult,
    images: Vec<Arc<CanvasImage>>,
}

/// Renders size comparisons onto an attached surface.
///
/// The surface is exclusively borrowed by each [`Rendered`] result, so a
/// layout handed out by one render cannot outlive the next.
pub struct SizeDiffRenderer<S: CanvasSurface = Canvas2dContext> {
    options: RenderOptions,
    provider: Arc<ImageProvider>,
    adjustment: Box<dyn HeightAdjustment>,
    surface: Option<S>,
}

impl SizeDiffRenderer<Canvas2dContext> {
    /// Renderer with a system-font canvas already attached.
    pub fn with_default_canvas(
        options: RenderOptions,
        provider: Arc<ImageProvider>,
    ) -> SizeDiffResult<Self> {
        let mut renderer = Self::new(options, provider)?;
        renderer.attach_surface(default_canvas()?);
        Ok(renderer)
    }
}

impl<S: CanvasSurface> SizeDiffRenderer<S> {
    /// Renderer without a surface; `layout` works, `render` needs [`Self::attach_surface`].
    pub fn new(options: RenderOptions, provider: Arc<ImageProvider>) -> SizeDiffResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            provider,
            adjustment: Box::new(IdentityAdjustment),
            surface: None,
        })
    }

    /// Height policy used when `use_species_scaling` is set.
    pub fn with_height_adjustment(mut self, adjustment: impl HeightAdjustment + 'static) -> Self {
        self.adjustment = Box::new(adjustment);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) -> SizeDiffResult<()> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    pub fn provider(&self) -> &Arc<ImageProvider> {
        &self.provider
    }

    /// Attach a surface, returning the one it replaces.
    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        self.surface.replace(surface)
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    async fn prepare(&self, characters: &[Character]) -> SizeDiffResult<PreparedScene> {
        let metrics = compute_metrics(characters, &self.options, self.adjustment.as_ref())?;

        let paths = characters
            .iter()
            .enumerate()
            .map(|(index, c)| {
                self.provider
                    .asset_path_for(c)
                    .map_err(|e| asset_error(index, e))
            })
            .collect::<SizeDiffResult<Vec<_>>>()?;

        let resolved = self.provider.prefetch(paths.iter().cloned()).await;
        let images = paths
            .iter()
            .enumerate()
            .map(|(index, path)| match resolved.get(path) {
                Some(Ok(image)) => Ok(image.image.clone()),
                Some(Err(err)) => Err(asset_error(index, err.clone())),
                None => Err(SizeDiffError::AssetResolution {
                    index,
                    path: path.display().to_string(),
                    reason: "image was not prefetched".to_string(),
                }),
            })
            .collect::<SizeDiffResult<Vec<_>>>()?;

        let layout = compute_layout(characters, &self.options, metrics, |index, _| {
            Ok(ImageSize {
                width: images[index].width(),
                height: images[index].height(),
            })
        })?;
        Ok(PreparedScene { layout, images })
    }

    /// Compute the layout without drawing.
    pub async fn layout(&self, characters: &[Character]) -> SizeDiffResult<LayoutResult> {
        Ok(self.prepare(characters).await?.layout)
    }

    /// Render `characters` onto the attached surface.
    ///
    /// On error the surface content is unspecified and no result is returned.
    pub async fn render(&mut self, characters: &[Character]) -> SizeDiffResult<Rendered<'_, S>> {
        if self.surface.is_none() {
            return Err(SizeDiffError::UninitializedSurface);
        }
        let PreparedScene { layout, images } = self.prepare(characters).await?;
        let surface = self
            .surface
            .as_mut()
            .ok_or(SizeDiffError::UninitializedSurface)?;
        paint(surface, characters, &layout, &images, &self.options)?;
        Ok(Rendered {
            layout,
            surface: &*surface,
        })
    }
}

fn paint<S: CanvasSurface>(
    surface: &mut S,
    characters: &[Character],
    layout: &LayoutResult,
    images: &[Arc<CanvasImage>],
    options: &RenderOptions,
) -> SizeDiffResult<()> {
    surface.set_size(layout.width, layout.height)?;
    surface.set_fill_color(&options.background_color)?;
    surface.fill_rect(0.0, 0.0, layout.width as f32, layout.height as f32);

    for line in grid_lines(layout) {
        surface.stroke_line(&line, &options.grid_color, options.grid_line_width, None)?;
    }

    let font = format!("{}px {}", layout.font_size, options.font_family);
    let font_size = layout.font_size as f32;

    for (index, character) in characters.iter().enumerate() {
        let placement = layout.placements[index];
        let tinted = match character.tint_css() {
            Some(css) => Some(apply_tint::<S>(&images[index], &css)?),
            None => None,
        };
        let image = tinted.as_ref().unwrap_or(&*images[index]);

        surface.draw_image(
            image,
            placement.x as f32,
            placement.y as f32,
            placement.width as f32,
            placement.height as f32,
        );

        let color = dominant_color::<S>(image)?.to_css();
        if let Some(indicator) = height_indicator(index, character, layout, options) {
            surface.stroke_line(
                &indicator.line,
                &color,
                indicator.style.line_width as f32,
                Some(indicator.style),
            )?;
        }

        surface.set_fill_color(&color)?;
        surface.set_font(&font)?;
        let text_x = placement.text_x as f32;
        let text_y = placement.text_y as f32;
        surface.fill_text(&character.name, text_x, text_y - (font_size + 5.0));

        let adjusted_height = layout.metrics.characters[index].adjusted_height;
        for (line_index, line) in label_lines(character, adjusted_height).iter().enumerate() {
            surface.fill_text(line, text_x, text_y + line_index as f32 * (font_size + 2.0));
        }
    }
    Ok(())
}

/// A finished render and the layout it was drawn from.
pub struct Rendered<'a, S: CanvasSurface> {
    pub layout: LayoutResult,
    surface: &'a S,
}

impl<S: CanvasSurface> Rendered<'_, S> {
    pub fn surface(&self) -> &S {
        self.surface
    }

    /// Index of the character drawn at a canvas point.
    pub fn character_at(&self, x: f64, y: f64) -> Option<usize> {
        self.layout.character_at(x, y)
    }

    pub fn to_png(&self) -> SizeDiffResult<Vec<u8>> {
        self.surface.to_png()
    }

    /// PNG bytes in standard base64.
    pub fn to_base64(&self) -> SizeDiffResult<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_png()?))
    }

    pub fn to_data_url(&self) -> SizeDiffResult<String> {
        Ok(format!("data:image/png;base64,{}", self.to_base64()?))
    }
}
