//! Structural validation of an incoming data request.
//!
//! Runs before any schema resolution so malformed requests are rejected
//! without touching the schema or the connector.

use tableaux_core::DataRequest;

/// Structural defects of a [`DataRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("parameter 'Length' must be positive and greater than 0")]
    NonPositiveLength,
    #[error("parameter 'Start' must be positive and greater or equal to 0")]
    NegativeStart,
    #[error("parameter 'Draw' must be positive and greater or equal to 0")]
    NegativeDraw,
    #[error("no columns selected")]
    NoColumns,
}

/// Checks pagination bounds, the echo token and column presence.
///
/// The first failing check wins, in this order: length, start, draw, columns.
///
/// # Errors
///
/// Returns the first [`RequestError`] encountered.
pub fn validate_request(request: &DataRequest) -> Result<(), RequestError> {
    if request.length <= 0 {
        return Err(RequestError::NonPositiveLength);
    }
    if request.start < 0 {
        return Err(RequestError::NegativeStart);
    }
    if request.draw < 0 {
        return Err(RequestError::NegativeDraw);
    }
    if request.columns.is_empty() {
        return Err(RequestError::NoColumns);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tableaux_core::Column;

    use super::*;

    fn valid() -> DataRequest {
        DataRequest {
            start: 0,
            draw: 1,
            length: 10,
            columns: vec![Column::new("age")],
            ..DataRequest::default()
        }
    }

    #[test]
    fn accepts_valid_request() {
        assert_eq!(validate_request(&valid()), Ok(()));
    }

    #[test]
    fn accepts_zero_draw_and_start() {
        let req = DataRequest {
            draw: 0,
            start: 0,
            ..valid()
        };
        assert_eq!(validate_request(&req), Ok(()));
    }

    #[test]
    fn rejects_zero_length() {
        let req = DataRequest { length: 0, ..valid() };
        assert_eq!(validate_request(&req), Err(RequestError::NonPositiveLength));
    }

    #[test]
    fn rejects_negative_start() {
        let req = DataRequest { start: -1, ..valid() };
        assert_eq!(validate_request(&req), Err(RequestError::NegativeStart));
    }

    #[test]
    fn rejects_negative_draw() {
        let req = DataRequest { draw: -5, ..valid() };
        assert_eq!(validate_request(&req), Err(RequestError::NegativeDraw));
    }

    #[test]
    fn rejects_empty_columns() {
        let req = DataRequest {
            columns: Vec::new(),
            ..valid()
        };
        assert_eq!(validate_request(&req), Err(RequestError::NoColumns));
    }

    #[test]
    fn length_check_takes_precedence() {
        let req = DataRequest {
            start: -1,
            draw: -1,
            length: -1,
            columns: Vec::new(),
            ..DataRequest::default()
        };
        assert_eq!(validate_request(&req), Err(RequestError::NonPositiveLength));
    }

    #[test]
    fn start_check_precedes_draw_and_columns() {
        let req = DataRequest {
            start: -1,
            draw: -1,
            columns: Vec::new(),
            ..valid()
        };
        assert_eq!(validate_request(&req), Err(RequestError::NegativeStart));
    }

    #[test]
    fn draw_check_precedes_columns() {
        let req = DataRequest {
            draw: -1,
            columns: Vec::new(),
            ..valid()
        };
        assert_eq!(validate_request(&req), Err(RequestError::NegativeDraw));
    }

    #[test]
    fn messages_match_wire_wording() {
        assert_eq!(
            RequestError::NonPositiveLength.to_string(),
            "parameter 'Length' must be positive and greater than 0"
        );
        assert_eq!(
            RequestError::NegativeStart.to_string(),
            "parameter 'Start' must be positive and greater or equal to 0"
        );
        assert_eq!(
            RequestError::NegativeDraw.to_string(),
            "parameter 'Draw' must be positive and greater or equal to 0"
        );
        assert_eq!(RequestError::NoColumns.to_string(), "no columns selected");
    }
}
