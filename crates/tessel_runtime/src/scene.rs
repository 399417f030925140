//! Bouncing sprites demo
//!
//! Sprites drift inside the viewport and reflect off its edges. Some carry
//! a lifetime; when it runs out the register is removed and a fresh sprite
//! spawned under a new id, so the population stays constant.

use anyhow::{Context as _, Result};
use glam::Vec2;
use tessel_core::{
    ecs::{EcsError, World},
    math::{Colour, Rect},
};
use tessel_render::{ShaderHandle, TextureHandle};

use crate::engine::{Context, Game};

pub const SPRITE_SHADER: u64 = 1;
pub const SPRITE_TEXTURE: u64 = 2;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Velocity(pub Vec2);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub size: Vec2,
    pub colour: Colour,
    pub rotation: f32,
}

/// Fixed ticks left before the sprite is replaced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lifetime(pub u32);

/// World with the storages the demo declares.
pub fn build_world(max_entities: usize) -> Result<World, EcsError> {
    tessel_core::world!(
        "position": Position => max_entities,
        "velocity": Velocity => max_entities,
        "sprite": Sprite => max_entities,
        "lifetime": Lifetime => max_entities,
    )
}

pub struct BouncingSprites {
    count: usize,
    spawned: u64,
    shader: Option<ShaderHandle>,
    texture: Option<TextureHandle>,
}

impl BouncingSprites {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            spawned: 0,
            shader: None,
            texture: None,
        }
    }

    /// Sprites spawned so far, replacements included.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    fn bounds(ctx: &Context) -> Vec2 {
        Vec2::new(
            ctx.settings.window.width as f32,
            ctx.settings.window.height as f32,
        )
    }

    /// Deterministic spawn parameters derived from the spawn counter.
    fn spawn(&mut self, ctx: &mut Context) -> Result<u64> {
        let n = self.spawned;
        self.spawned += 1;

        let bounds = Self::bounds(ctx);
        let fx = ((n * 37) % 100) as f32 / 100.0;
        let fy = ((n * 61) % 100) as f32 / 100.0;
        let position = Vec2::new(fx * bounds.x, fy * bounds.y);
        let velocity = Vec2::from_angle(n as f32 * 0.7) * (40.0 + (n % 5) as f32 * 20.0);
        let hue = (n % 3) as usize;
        let mut rgba = [0.3, 0.3, 0.3, 1.0];
        rgba[hue] = 1.0;

        let world = &mut ctx.world;
        let id = world.create_register_unique()?;
        world.attach(id, "position", Position(position))?;
        world.attach(id, "velocity", Velocity(velocity))?;
        world.attach(
            id,
            "sprite",
            Sprite {
                size: Vec2::splat(16.0),
                colour: Colour::from(rgba),
                rotation: 0.0,
            },
        )?;
        if n % 4 == 0 {
            world.attach(id, "lifetime", Lifetime(30 + (n % 7) as u32 * 10))?;
        }
        Ok(id)
    }

    fn expire(&mut self, ctx: &mut Context) -> Result<()> {
        let mut expired = Vec::new();
        for id in ctx.world.matching_ids(&["lifetime"]) {
            let lifetime = ctx.world.get_mut::<Lifetime>(id, "lifetime")?;
            lifetime.0 = lifetime.0.saturating_sub(1);
            if lifetime.0 == 0 {
                expired.push(id);
            }
        }
        for id in expired {
            ctx.world.remove_register(id)?;
            self.spawn(ctx)?;
        }
        Ok(())
    }
}

impl Game for BouncingSprites {
    fn init(&mut self, ctx: &mut Context) -> Result<()> {
        self.shader = Some(ctx.assets.load_shader(ctx.backend.as_mut(), SPRITE_SHADER)?);
        self.texture = Some(ctx.assets.load_texture(ctx.backend.as_mut(), SPRITE_TEXTURE)?);
        for _ in 0..self.count {
            self.spawn(ctx).context("spawning initial sprites")?;
        }
        Ok(())
    }

    fn fixed_update(&mut self, ctx: &mut Context, dt: f32) -> Result<()> {
        let bounds = Self::bounds(ctx);
        for id in ctx.world.matching_ids(&["position", "velocity"]) {
            let mut velocity = *ctx.world.get::<Velocity>(id, "velocity")?;
            let position = ctx.world.get_mut::<Position>(id, "position")?;

            let mut next = position.0 + velocity.0 * dt;
            if next.x < 0.0 || next.x > bounds.x {
                velocity.0.x = -velocity.0.x;
                next.x = next.x.clamp(0.0, bounds.x);
            }
            if next.y < 0.0 || next.y > bounds.y {
                velocity.0.y = -velocity.0.y;
                next.y = next.y.clamp(0.0, bounds.y);
            }
            position.0 = next;
            *ctx.world.get_mut::<Velocity>(id, "velocity")? = velocity;

            if let Ok(sprite) = ctx.world.get_mut::<Sprite>(id, "sprite") {
                sprite.rotation += dt;
            }
        }
        self.expire(ctx)
    }

    fn draw(&mut self, ctx: &mut Context, _alpha: f32) -> Result<()> {
        let (Some(shader), texture) = (self.shader, self.texture) else {
            return Ok(());
        };
        let filter = ["position", "sprite"];
        for (register, _) in ctx.world.view(&filter) {
            let Some(register) = register else { continue };
            let id = register.id();
            let position = ctx.world.get::<Position>(id, "position")?;
            let sprite = ctx.world.get::<Sprite>(id, "sprite")?;

            let dest = Rect::new(
                position.0.x - sprite.size.x * 0.5,
                position.0.y - sprite.size.y * 0.5,
                sprite.size.x,
                sprite.size.y,
            );
            ctx.batches.draw_sprite(
                ctx.backend.as_mut(),
                shader,
                texture,
                dest,
                Rect::new(0.0, 0.0, 1.0, 1.0),
                sprite.size * 0.5,
                sprite.rotation,
                sprite.colour,
            )?;
        }
        Ok(())
    }
}
