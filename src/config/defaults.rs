use super::Config;

pub fn defaults() -> Config {
    Config::default()
}

/// Reject settings that would make a round unplayable
pub fn validate(cfg: &Config) -> anyhow::Result<()> {
    let game = &cfg.game;
    if game.questions_per_round == 0 {
        anyhow::bail!("game.questions_per_round must be at least 1");
    }
    if game.countdown_ticks == 0 {
        anyhow::bail!("game.countdown_ticks must be at least 1");
    }
    if game.tick_ms == 0 {
        anyhow::bail!("game.tick_ms must be positive");
    }
    if game.pool_size < game.questions_per_round {
        anyhow::bail!(
            "game.pool_size ({}) is smaller than game.questions_per_round ({})",
            game.pool_size,
            game.questions_per_round
        );
    }
    if cfg.scores.history_limit == 0 {
        anyhow::bail!("scores.history_limit must be at least 1");
    }
    Ok(())
}
