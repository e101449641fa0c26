/*!

This is the long-form manual for `registration_stats` and the `antorcha` command.

## Input formats

The registrations are read from a single file:
* `csv` Comma Separated Values, the first line being the header
* any spreadsheet format supported by `calamine` (`xlsx`, `xlsm`, `xls`, `xlsb`, `ods`).
  The first worksheet is used unless a worksheet name is given.

The format is chosen from the extension of the file: `.csv` files are read as text,
everything else as a spreadsheet.

### Columns

The names of the columns are compared after removing the spaces around them. The
following columns are recognized (the names can be changed in the configuration file):

| Column           | Use                                      | Shown as   |
|------------------|------------------------------------------|------------|
| `Nombres`        | first name                               | `Nombre`   |
| `Apellidos`      | last name                                | `Apellido` |
| `Líder directo:` | leader filter, ranking                   | `Líder`    |
| `Teléfono`       | phone number                             | `Celular`  |
| `Entrada`        | ticket type, category filter, ranking    | `Tipo`     |
| `Fecha de pago`  | payment date filter                      | `Fecha`    |

All the columns are optional. Without `Fecha de pago` the date range is ignored, without
`Líder directo:` or `Entrada` the corresponding filter is ignored and no ranking is produced.
Other columns are ignored.

The category of a registration is the ticket type up to the first opening parenthesis:
`VIP (Oferta hasta el 10)` belongs to the category `VIP`.

### Dates

Spreadsheet dates are read directly. Text dates are tried against a list of formats
(`%Y-%m-%d`, `%d/%m/%Y`, ...). A date that cannot be read is left empty: the registration
is still counted in the percentage base, but it is never part of a date range.

Day-first formats come before month-first ones, so `10/01/2025` is the 10th of January.
This is not what spreadsheet exports from US locales or pandas' `to_datetime` do by default:
for month-first files, set `"dateFormats": ["%m/%d/%Y"]` in the configuration.

## Filters

* **Date range**: both ends are included. Without `--from` and `--to` the range goes from the
  first to the last payment date of the file, so the registrations without a readable date
  are not shown. A range with only a start date is ignored, which is what happens while a
  user is halfway through picking a range.
* **Leader** and **category**: exact match. The value `Todos` selects everything, and
  `Sin dato` selects the registrations where the column is empty.

## Configuration

The `--config` flag takes a JSON file. All the keys are optional.

```json
{
  "input": {
    "filePath": "PAGO DE ANTORCHA 2026.xlsx",
    "excelWorksheetName": "Hoja1",
    "dateFormats": ["%d/%m/%Y"],
    "columns": { "leader": "Líder directo:", "ticketType": "Entrada" }
  },
  "display": {
    "title": "ANTORCHA 2026",
    "truncateLength": 20,
    "groupBy": "category",
    "allLabel": "Todos",
    "colors": { "fixed": { "VIP": "#f59e0b" }, "fallback": "#9ca3af" }
  }
}
```

* `truncateLength`: leader names longer than this are shortened on the ranking axis.
  The full name is still used for filtering and grouping.
* `groupBy`: `category` or `ticketType`, the column used for the segments of the ranking.
* `colors`: either a `palette` (colors handed out in order) or a `fixed` mapping from
  label to color with a `fallback`. The default is Plotly's "Prism" palette.

## Interactive session

With `--interactive`, the command reads instructions from the standard input and prints
the dashboard again after each change:

```text
leader Lider1
category VIP
dates 2025-01-01 2025-01-31
refresh
quit
```

`dates` without arguments goes back to the full range of the file. `refresh` forgets the
loaded file and reads it again.

*/
