//! Status bar texts written by agents and the player controller.

use crate::Position;

pub const PATROL_CAUGHT: &str = "⚠️  The patrol caught you! Careful!";
pub const ENEMY_DEFLECTED: &str = "🛡️ An enemy ran into you and turned back!";
pub const PORTAL_ENTERED: &str = "🚪 You entered the portal in time!";
pub const PORTAL_EXPIRED: &str = "⏱️ The portal vanished!";
pub const TRAP_DISARMED: &str = "🔕 The trap was disarmed!";
pub const TRAP_STEPPED: &str = "💥 You stepped on a trap!";
pub const TRAP_FELL: &str = "💥 You fell into a trap!";

pub fn interacting_at(pos: Position) -> String {
    format!("Interacting at ({}, {})", pos.x, pos.y)
}
