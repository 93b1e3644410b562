use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Installs a stderr fmt layer. Events from this binary and the geometry core
/// use `level`; everything else is held to warnings.
pub(crate) fn setup_tracing(level: LevelFilter) {
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let target = metadata.target();
        let ours = target.starts_with("sweep") || target.starts_with("core");
        let effective = if ours {
            level
        } else {
            LevelFilter::WARN.min(level)
        };
        effective >= *metadata.level()
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}

pub(crate) fn level_from_flags(verbose: bool, quiet: bool) -> LevelFilter {
    match (verbose, quiet) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::WARN,
        (false, false) => LevelFilter::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins_over_quiet() {
        assert_eq!(level_from_flags(true, true), LevelFilter::DEBUG);
        assert_eq!(level_from_flags(false, true), LevelFilter::WARN);
        assert_eq!(level_from_flags(false, false), LevelFilter::INFO);
    }
}
