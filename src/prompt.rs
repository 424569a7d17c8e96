use std::io::{self, BufRead, Write};

use gcal_events::calendar::{DraftBuilder, EventDraft, Step};

/// Asks for each field until the builder accepts it. End of input aborts.
pub fn collect_draft<R: BufRead, W: Write>(
    mut builder: DraftBuilder,
    input: &mut R,
    output: &mut W,
) -> io::Result<EventDraft> {
    while !builder.is_complete() {
        write!(output, "{}", builder.prompt())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before the event was complete",
            ));
        }
        let line = line.trim_end_matches(['\r', '\n']);

        match builder.submit(line) {
            Ok(Step::AttendeeCapReached(_)) => {
                writeln!(output, "You have added the maximum number of attendees.")?;
            }
            Ok(Step::Next(_)) => {}
            Err(e) => {
                tracing::debug!("Rejected {:?} input: {}", builder.field(), e);
                writeln!(output, "{}", e)?;
            }
        }
    }

    builder
        .finish()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gcal_events::calendar::AttendeeValidator;
    use std::io::Cursor;

    fn builder() -> DraftBuilder {
        DraftBuilder::new(
            AttendeeValidator::default(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            2050,
        )
    }

    #[test]
    fn reprompts_until_each_field_is_valid() {
        let script = "Party\nHome\nfriend@gmail.com\nfriend@student.monash.edu\n\n2051-01-01\n2030-01-01\n25:00\n10:00\n2029-12-31\n2030-01-01\n09:00\n11:00\n";
        let mut input = Cursor::new(script);
        let mut output = Vec::new();

        let draft = collect_draft(builder(), &mut input, &mut output).unwrap();
        let shown = String::from_utf8(output).unwrap();

        assert_eq!(draft.attendees().len(), 1);
        assert_eq!(draft.end_timestamp(), "2030-01-01T11:00:00+10:00");
        assert!(shown.contains("Attendee does not belong your native domain."));
        assert!(shown.contains("Unable to create events beyond the year 2050."));
        assert!(shown.contains("Invalid input."));
        assert!(shown.contains("The ending date must be on or after the starting date."));
        assert!(shown.contains("The ending time must be after starting time."));
    }

    #[test]
    fn cap_message_is_printed_once() {
        let mut script = String::from("Name\nRoom\n");
        for n in 1..=20 {
            script.push_str(&format!("stso{:04}@student.monash.edu\n", n));
        }
        script.push_str("2050-12-31\n16:30\n2050-12-31\n17:30\n");
        let mut output = Vec::new();

        let draft = collect_draft(builder(), &mut Cursor::new(script), &mut output).unwrap();
        let shown = String::from_utf8(output).unwrap();

        assert_eq!(draft.attendees().len(), 20);
        assert_eq!(
            shown.matches("You have added the maximum number of attendees.").count(),
            1
        );
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut output = Vec::new();

        let result = collect_draft(builder(), &mut Cursor::new("Name\n"), &mut output);

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
