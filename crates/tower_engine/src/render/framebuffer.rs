//! Framebuffer chain
//!
//! The scene renders into a framebuffer with two color attachments: 0 holds
//! the lit color and 1 the bright pass feeding bloom. Each bloom tier owns a
//! framebuffer at half the previous tier's size with two attachments used as
//! a ping-pong pair: 0 receives the horizontal blur, 1 the downsample and the
//! vertical blur.

use super::device::{FramebufferDesc, FramebufferId, GraphicsDevice, RenderTarget};
use super::{RenderError, RenderResult};

/// Attachment of the scene framebuffer holding the lit color
pub const SCENE_COLOR: u32 = 0;
/// Attachment of the scene framebuffer holding the bright pass
pub const SCENE_BRIGHT: u32 = 1;
/// Attachment of a bloom tier written by the horizontal blur
pub const TIER_HORIZONTAL: u32 = 0;
/// Attachment of a bloom tier written by the downsample and the vertical blur
pub const TIER_VERTICAL: u32 = 1;

/// One bloom tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomTier {
    /// Ping-pong framebuffer
    pub framebuffer: FramebufferId,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl BloomTier {
    /// Target of the horizontal blur
    pub const fn horizontal(&self) -> RenderTarget {
        RenderTarget::Attachment(self.framebuffer, TIER_HORIZONTAL)
    }

    /// Target of the downsample and vertical blur
    pub const fn vertical(&self) -> RenderTarget {
        RenderTarget::Attachment(self.framebuffer, TIER_VERTICAL)
    }
}

/// Scene framebuffer plus bloom tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferChain {
    width: u32,
    height: u32,
    scene: FramebufferId,
    tiers: Vec<BloomTier>,
}

fn checked<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    desc: &FramebufferDesc,
    created: &mut Vec<FramebufferId>,
    what: &str,
) -> RenderResult<FramebufferId> {
    let framebuffer = device.create_framebuffer(desc)?;
    created.push(framebuffer);
    if device.is_framebuffer_complete(framebuffer) {
        Ok(framebuffer)
    } else {
        Err(RenderError::FramebufferIncomplete(format!(
            "{what} ({}x{})",
            desc.width, desc.height
        )))
    }
}

impl FramebufferChain {
    /// Create the scene framebuffer and `tiers` bloom tiers
    ///
    /// Nothing is left allocated when any framebuffer is incomplete.
    pub fn new<D: GraphicsDevice + ?Sized>(device: &mut D, width: u32, height: u32, tiers: usize) -> RenderResult<Self> {
        let mut created = Vec::with_capacity(tiers + 1);
        match Self::build(device, width, height, tiers, &mut created) {
            Ok(chain) => {
                log::debug!("Framebuffer chain {width}x{height} with {tiers} bloom tiers");
                Ok(chain)
            }
            Err(e) => {
                for framebuffer in created {
                    device.destroy_framebuffer(framebuffer);
                }
                log::error!("Framebuffer chain setup failed: {e}");
                Err(e)
            }
        }
    }

    fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        width: u32,
        height: u32,
        tiers: usize,
        created: &mut Vec<FramebufferId>,
    ) -> RenderResult<Self> {
        let scene_desc = FramebufferDesc {
            width,
            height,
            color_attachments: 2,
            depth: true,
        };
        let scene = checked(device, &scene_desc, created, "scene framebuffer")?;

        let mut chain = Self {
            width,
            height,
            scene,
            tiers: Vec::with_capacity(tiers),
        };
        let (mut w, mut h) = (width, height);
        for i in 0..tiers {
            w = (w / 2).max(1);
            h = (h / 2).max(1);
            let desc = FramebufferDesc {
                width: w,
                height: h,
                color_attachments: 2,
                depth: false,
            };
            let framebuffer = checked(device, &desc, created, &format!("bloom tier {i}"))?;
            chain.tiers.push(BloomTier {
                framebuffer,
                width: w,
                height: h,
            });
        }
        Ok(chain)
    }

    /// Release every framebuffer
    pub fn destroy<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        device.destroy_framebuffer(self.scene);
        for tier in &self.tiers {
            device.destroy_framebuffer(tier.framebuffer);
        }
    }

    /// Replace the chain with one at a new size
    pub fn recreate<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, width: u32, height: u32) -> RenderResult<()> {
        self.destroy(device);
        *self = Self::new(device, width, height, self.tiers.len())?;
        Ok(())
    }

    /// Clear the back buffer and every framebuffer of the chain
    pub fn clear_all<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        device.bind_target(RenderTarget::BackBuffer);
        device.clear();
        self.clear_framebuffers(device);
    }

    /// Clear the scene framebuffer and every bloom tier
    pub fn clear_framebuffers<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        device.bind_target(RenderTarget::Framebuffer(self.scene));
        device.clear();
        for tier in &self.tiers {
            device.bind_target(RenderTarget::Framebuffer(tier.framebuffer));
            device.clear();
        }
    }

    /// Size of the scene framebuffer
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Scene framebuffer
    pub const fn scene(&self) -> FramebufferId {
        self.scene
    }

    /// Bloom tiers, largest first
    pub fn tiers(&self) -> &[BloomTier] {
        &self.tiers
    }
}
