use glam::Vec2;

/// Health of a fresh oil blob under emulsification.
pub const INITIAL_HEALTH: i32 = 50;
/// Frames an oil blob stays white after a surfactant strike.
pub const HIT_FLASH_FRAMES: u8 = 3;

/// Stable handle of a particle within its scene. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ParticleId(pub u32);

/// Kind tag without per-kind state.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ParticleClass {
    Oil = 0,
    Surfactant = 1,
    TinyOil = 2,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct OilState {
    /// Pinned to the rock; ignores velocity.
    pub stuck: bool,
    /// Remaining strikes before breakup (emulsification only).
    pub health: i32,
    /// Squash/stretch factors along x and y.
    pub deformation: Vec2,
    /// Countdown for the impact flash.
    pub hit_flash: u8,
}

impl Default for OilState {
    fn default() -> Self {
        Self {
            stuck: false,
            health: INITIAL_HEALTH,
            deformation: Vec2::ONE,
            hit_flash: 0,
        }
    }
}

/// A surfactant coating an oil blob (tension only).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Attachment {
    pub target: ParticleId,
    /// Orbital phase in radians.
    pub angle: f32,
    /// Recycle epoch of the target when the attachment formed.
    pub epoch: u32,
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct SurfactantState {
    /// Permanently adhered to a wall as a coating streak.
    pub wall_film: bool,
    pub attachment: Option<Attachment>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ParticleKind {
    Oil(OilState),
    Surfactant(SurfactantState),
    TinyOil,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub id: ParticleId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Marked for removal at the start of the next step.
    pub dead: bool,
    /// Bumped every time the particle re-enters from the left edge.
    pub epoch: u32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new(id: ParticleId, kind: ParticleKind, position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            dead: false,
            epoch: 0,
            kind,
        }
    }

    pub fn oil(id: ParticleId) -> Self {
        Self::new(id, ParticleKind::Oil(OilState::default()), Vec2::ZERO, Vec2::ZERO, 15.0)
    }

    pub fn surfactant(id: ParticleId) -> Self {
        Self::new(
            id,
            ParticleKind::Surfactant(SurfactantState::default()),
            Vec2::ZERO,
            Vec2::ZERO,
            2.5,
        )
    }

    pub fn class(&self) -> ParticleClass {
        match self.kind {
            ParticleKind::Oil(_) => ParticleClass::Oil,
            ParticleKind::Surfactant(_) => ParticleClass::Surfactant,
            ParticleKind::TinyOil => ParticleClass::TinyOil,
        }
    }

    pub fn oil_state(&self) -> Option<&OilState> {
        match &self.kind {
            ParticleKind::Oil(oil) => Some(oil),
            _ => None,
        }
    }

    pub fn oil_state_mut(&mut self) -> Option<&mut OilState> {
        match &mut self.kind {
            ParticleKind::Oil(oil) => Some(oil),
            _ => None,
        }
    }

    pub fn surfactant_state(&self) -> Option<&SurfactantState> {
        match &self.kind {
            ParticleKind::Surfactant(surf) => Some(surf),
            _ => None,
        }
    }

    pub fn surfactant_state_mut(&mut self) -> Option<&mut SurfactantState> {
        match &mut self.kind {
            ParticleKind::Surfactant(surf) => Some(surf),
            _ => None,
        }
    }

    pub fn is_stuck(&self) -> bool {
        self.oil_state().is_some_and(|oil| oil.stuck)
    }

    pub fn is_wall_film(&self) -> bool {
        self.surfactant_state().is_some_and(|surf| surf.wall_film)
    }

    pub fn attached_to(&self) -> Option<ParticleId> {
        self.surfactant_state()
            .and_then(|surf| surf.attachment)
            .map(|a| a.target)
    }

    /// Identity for anything that is not an oil blob.
    pub fn deformation(&self) -> Vec2 {
        self.oil_state().map_or(Vec2::ONE, |oil| oil.deformation)
    }

    /// Pinned or orbiting particles neither integrate nor collide.
    pub fn is_anchored(&self) -> bool {
        self.is_stuck() || self.attached_to().is_some()
    }

    #[inline]
    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_kind() {
        let mut oil = Particle::oil(ParticleId(1));
        assert_eq!(oil.class(), ParticleClass::Oil);
        assert!(oil.surfactant_state().is_none());
        assert_eq!(oil.oil_state().map(|o| o.health), Some(INITIAL_HEALTH));
        oil.oil_state_mut().unwrap().stuck = true;
        assert!(oil.is_stuck());
        assert!(oil.is_anchored());

        let mut surf = Particle::surfactant(ParticleId(2));
        assert_eq!(surf.deformation(), Vec2::ONE);
        assert_eq!(surf.attached_to(), None);
        surf.surfactant_state_mut().unwrap().attachment = Some(Attachment {
            target: ParticleId(1),
            angle: 0.0,
            epoch: 0,
        });
        assert_eq!(surf.attached_to(), Some(ParticleId(1)));
        assert!(surf.is_anchored());
    }

    #[test]
    fn test_integrate() {
        let mut p = Particle::new(
            ParticleId(0),
            ParticleKind::TinyOil,
            Vec2::new(1.0, 2.0),
            Vec2::new(0.5, -1.0),
            3.0,
        );
        p.integrate();
        assert_eq!(p.position, Vec2::new(1.5, 1.0));
    }
}
