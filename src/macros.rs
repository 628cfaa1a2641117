#[allow(dead_code)]
pub enum LogType {
    Print,
    Println,
    Info,
    Debug,
    Warn,
    Error,
    Trace,
}

/// Prints out the provided message through a logger controlled by the logtype param.
///
/// # Example
///
/// ```no run
/// # fn main {
///     show_message!("Hello!", LogType::Info);
/// #}
#[macro_export]
macro_rules! show_message {
    ($msg: expr, $logtype: expr) => {
        use $crate::macros::LogType;
        match $logtype {
            LogType::Print => print!("{}", $msg),
            LogType::Println => println!("{}", $msg),
            LogType::Info => log::info!("{}", $msg),
            LogType::Debug => log::debug!("{}", $msg),
            LogType::Warn => log::warn!("{}", $msg),
            LogType::Error => log::error!("{}", $msg),
            LogType::Trace => log::trace!("{}", $msg),
        }
    };
}

/// Measures the time duration of the provided function and prints out the message
/// through a logger controlled by the logtype param (debug log if omitted).
///
/// # Example
///
/// ```no run
/// # fn main {
///     measure_time!("scoring pages", || { println!("This is some func") }, LogType::Info);
/// #}
#[macro_export]
macro_rules! measure_time {
    ($msg: expr, $fn: expr) => {{
        let instant = std::time::Instant::now();
        let res = $fn();
        log::debug!(
            "Finished \"{}\" in {} ms",
            $msg,
            instant.elapsed().as_millis(),
        );
        res
    }};
    ($msg: expr, $fn: expr, $logtype: expr) => {{
        let instant = std::time::Instant::now();
        let res = $fn();
        $crate::show_message!(
            format!(
                "Finished \"{}\" in {} ms",
                $msg,
                instant.elapsed().as_millis(),
            ),
            $logtype
        );
        res
    }};
}

#[cfg(test)]
mod tests {
    use crate::dataset::{get_polys_from_file, LoadedPolys};
    use anyhow::Result;

    #[test]
    fn measure_time_no_return_value() {
        let mut val = 0;
        assert_eq!(
            measure_time!(
                "testing measure",
                || {
                    val += 1;
                },
                LogType::Info
            ),
            ()
        );
        assert_eq!(val, 1);
    }

    #[test]
    fn measure_time_with_return_value() {
        let val = 0;
        assert_eq!(
            measure_time!("testing measure", || { val + 1 }, LogType::Info),
            1
        );
        assert_eq!(measure_time!("testing measure", || val + 2), 2);
    }

    #[test]
    fn measure_time_ok_result() -> Result<()> {
        let res = measure_time!(
            "loading polygons",
            || get_polys_from_file("./test_data/reco_page1.txt"),
            LogType::Error
        );
        match res? {
            LoadedPolys::Polygons(polygons) => assert_eq!(polygons.len(), 6),
            other => panic!("unexpected result {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn measure_time_err_result() {
        let res = measure_time!(
            "loading polygons",
            || get_polys_from_file("./test_data/non-existing.txt"),
            LogType::Warn
        );
        assert!(res.is_err());
    }
}
