pub use crate::config::*;

use chrono::NaiveDate;

/// A builder for assembling a dataset one registration at a time.
///
/// The readers in the command line tool use it after mapping the columns of a file.
///
/// ```
/// use registration_stats::builder::DatasetBuilder;
/// use registration_stats::Field;
///
/// let mut builder = DatasetBuilder::new(&[Field::FirstName, Field::Leader, Field::TicketType]);
/// builder.add_simple("Ana", "Lider1", "VIP (Oferta)", None);
/// let dataset = builder.build();
///
/// assert_eq!(dataset.records()[0].category(), "VIP");
/// ```
pub struct DatasetBuilder {
    pub(crate) _fields: Vec<Field>,
    pub(crate) _records: Vec<Registration>,
}

impl DatasetBuilder {
    pub fn new(fields: &[Field]) -> DatasetBuilder {
        DatasetBuilder {
            _fields: fields.to_vec(),
            _records: Vec::new(),
        }
    }

    /// Adds a registration with only a name, a leader, a ticket type and a date.
    ///
    /// It is mostly useful for tests and small examples.
    pub fn add_simple(
        &mut self,
        first_name: &str,
        leader: &str,
        ticket_type: &str,
        payment_date: Option<NaiveDate>,
    ) {
        self.add(Registration::new(
            Some(first_name.to_string()),
            None,
            Some(leader.to_string()),
            None,
            Some(ticket_type.to_string()),
            payment_date,
        ))
    }

    /// Adds a registration.
    ///
    /// The values of the columns that were not declared with `new` are dropped,
    /// so that a record never holds more than its dataset advertises.
    pub fn add(&mut self, r: Registration) {
        let keep = |f: Field| self._fields.contains(&f);
        let rec = Registration::new(
            r.first_name.filter(|_| keep(Field::FirstName)),
            r.last_name.filter(|_| keep(Field::LastName)),
            r.leader.filter(|_| keep(Field::Leader)),
            r.phone.filter(|_| keep(Field::Phone)),
            r.ticket_type.filter(|_| keep(Field::TicketType)),
            r.payment_date.filter(|_| keep(Field::PaymentDate)),
        );
        self._records.push(rec);
    }

    pub fn len(&self) -> usize {
        self._records.len()
    }

    pub fn is_empty(&self) -> bool {
        self._records.is_empty()
    }

    pub fn build(self) -> Dataset {
        Dataset::new(&self._fields, self._records)
    }
}
