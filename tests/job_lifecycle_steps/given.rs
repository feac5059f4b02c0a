//! Given steps for job lifecycle BDD scenarios.

use super::world::JobLifecycleWorld;
use rstest_bdd_macros::given;

#[given("a relay dispatching to channel {channel_id:u64}")]
fn relay_dispatching_to(world: &mut JobLifecycleWorld, channel_id: u64) {
    world.wire(channel_id);
}

#[given("the channel is unreachable")]
fn channel_is_unreachable(world: &mut JobLifecycleWorld) {
    world.transport.set_unavailable(true);
}
