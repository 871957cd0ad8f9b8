//! Multi-buffered render targets
//!
//! Write commands fill the back buffer, `present` hands the most recently
//! written buffer to a window and promotes it to front.

use crate::error::{RenderError, RenderResult};

use super::image::{Image, ImageProp};

/// Anything that can show a finished image
pub trait Window {
    fn present(&mut self, image: &Image);
}

/// One step of frame generation, run in push order against the back buffer
pub type WriteCommand<C> = Box<dyn FnMut(&mut Image, &mut C)>;

pub struct Swapchain<C> {
    images: Vec<Image>,
    commands: Vec<WriteCommand<C>>,
    front: usize,
    /// Slot written since the last present, if any
    pending: Option<usize>,
}

impl<C> Swapchain<C> {
    pub fn new(prop: ImageProp, count: usize) -> RenderResult<Self> {
        if count == 0 {
            return Err(RenderError::EmptySwapchain);
        }
        check_dimensions(prop)?;
        Ok(Self {
            images: (0..count).map(|_| Image::new(prop)).collect(),
            commands: Vec::new(),
            front: 0,
            pending: None,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn prop(&self) -> ImageProp {
        self.images[self.front].prop()
    }

    pub fn push_write_command<F>(&mut self, command: F)
    where
        F: FnMut(&mut Image, &mut C) + 'static,
    {
        self.commands.push(Box::new(command));
    }

    /// Run every write command against the next slot. Returns that slot.
    pub fn acquire_and_write(&mut self, ctx: &mut C) -> usize {
        let slot = (self.front + 1) % self.images.len();
        let image = &mut self.images[slot];
        for command in &mut self.commands {
            command(image, ctx);
        }
        self.pending = Some(slot);
        slot
    }

    /// Show the last written image and make it the front buffer
    pub fn present<W: Window + ?Sized>(&mut self, window: &mut W) -> RenderResult<()> {
        let slot = self.pending.take().ok_or(RenderError::NothingToPresent)?;
        window.present(&self.images[slot]);
        self.front = slot;
        Ok(())
    }

    /// Image most recently presented (slot 0 before the first present)
    pub fn front(&self) -> &Image {
        &self.images[self.front]
    }

    /// Reallocate every buffer. Pending writes are dropped.
    pub fn resize(&mut self, prop: ImageProp) -> RenderResult<()> {
        check_dimensions(prop)?;
        for image in &mut self.images {
            image.resize(prop);
        }
        self.pending = None;
        tracing::debug!(width = prop.width, height = prop.height, "swapchain resized");
        Ok(())
    }
}

fn check_dimensions(prop: ImageProp) -> RenderResult<()> {
    if prop.width == 0 || prop.height == 0 {
        return Err(RenderError::InvalidDimensions {
            width: prop.width,
            height: prop.height,
        });
    }
    Ok(())
}
