#[cfg(not(debug_assertions))]
pub fn init_logging() {
    use syslog::BasicLogger;

    let logger = syslog::unix(
        // 3164 is the only formatter with log crate integration
        syslog::Formatter3164::default(),
    ).expect("syslog initialization failed");
    log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
        .map(|()| log::set_max_level(log::STATIC_MAX_LEVEL))
        .expect("syslog initialization failed");
}

#[cfg(debug_assertions)]
pub fn init_logging() {
    env_logger::init()
}
