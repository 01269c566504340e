//! Projection of the session state onto the backend-agnostic scene.

use robot_run_core::{CrawlerKind, Facing};
use robot_run_rendering::{Banner, DebugRect, DebugRectRole, Hud, Scene, Sprite, SpriteKind};
use robot_run_system_session::Session;
use robot_run_world::{query, Animation};

/// Rebuilds `scene` from the session's current world state.
pub(crate) fn compose(session: &Session, scene: &mut Scene) {
    let world = session.world();
    scene.clear();

    let grid = query::tile_grid(world);
    scene.sprites.extend(
        grid.solid_tiles()
            .map(|(rect, set)| Sprite::new(SpriteKind::Tile(set), rect).with_grayscale(grid.grayscale())),
    );

    for coin in query::coins(world) {
        scene.sprites.push(
            animated(SpriteKind::Coin, coin.rect(), coin.animation()).with_grayscale(coin.grayscale()),
        );
    }

    for crawler in query::crawlers(world) {
        let kind = if crawler.kind() == CrawlerKind::Strong && !crawler.jumped_on() {
            CrawlerKind::Strong
        } else {
            CrawlerKind::Weak
        };
        scene.sprites.push(
            animated(
                SpriteKind::Crawler(kind),
                crawler.screen_rect(),
                crawler.animation(),
            )
            .with_flip(crawler.facing() == Facing::Left)
            .with_grayscale(crawler.grayscale()),
        );
    }

    let robot = query::robot(world);
    if robot.is_visible() {
        scene.sprites.push(
            animated(SpriteKind::Robot, robot.screen_rect(), robot.animation())
                .with_flip(robot.facing() == Facing::Left)
                .with_grayscale(robot.grayscale()),
        );
    }

    for meteor in query::meteors(world) {
        scene.sprites.push(
            animated(SpriteKind::Meteor, meteor.rect(), meteor.animation())
                .with_rotation(meteor.rotation())
                .with_grayscale(meteor.grayscale()),
        );
    }

    for explosion in query::explosions(world) {
        scene.sprites.push(
            animated(SpriteKind::Explosion, explosion.rect(), explosion.animation())
                .with_grayscale(explosion.grayscale()),
        );
    }

    if session.debug_rects_visible() {
        let collision = |rect| DebugRect::new(rect, DebugRectRole::Collision);
        let probe = |rect| DebugRect::new(rect, DebugRectRole::Probe);

        scene.debug_rects.push(collision(robot.collision_rect()));
        scene.debug_rects.push(probe(robot.feet_probe()));
        scene.debug_rects.push(probe(robot.head_probe()));
        for crawler in query::crawlers(world) {
            scene.debug_rects.push(collision(crawler.collision_rect()));
            scene.debug_rects.extend(crawler.sensed_tile().map(probe));
        }
        scene
            .debug_rects
            .extend(query::coins(world).iter().map(|coin| collision(coin.rect())));
        scene
            .debug_rects
            .extend(query::meteors(world).iter().map(|meteor| collision(meteor.rect())));
    }

    scene.hud = Hud {
        score: query::score(world),
        lives: query::lives(world),
        scene: query::scene(world).map_or(0, |scene| scene.get()),
    };
    scene.banner = if query::is_game_over(world) {
        Banner::GameOver
    } else if query::goal_reached(world) {
        Banner::Victory
    } else if session.is_paused() {
        Banner::Paused
    } else {
        Banner::None
    };
}

fn animated(kind: SpriteKind, rect: robot_run_core::Rect, animation: &Animation) -> Sprite {
    Sprite::new(kind, rect).with_frame(
        animation.key(),
        animation.frame_index(),
        animation.is_placeholder(),
    )
}
