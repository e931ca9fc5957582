mod common;

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ndarray::{array, Array2, Array3};
use rusty_collections::data::convert::*;
use rusty_collections::{
    convert_collection, equal_length, get_n_cases, get_n_channels, get_n_timepoints, get_type,
    has_missing, is_equal_length, is_univariate, resolve_equal_length_inner_type,
    resolve_unequal_length_inner_type, Collection, CollectionType,
};

use common::{
    equal_length_multivariate, equal_length_univariate, init_logging, random_numpy3d,
    unequal_length_univariate, N_CASES, N_TIMEPOINTS,
};

#[test]
fn converts_between_every_pair_of_layouts() -> Result<()> {
    init_logging();
    for input in CollectionType::ALL {
        for output in CollectionType::ALL {
            let x = equal_length_univariate(input)?;
            let y = convert_collection(&x, output)?;
            assert_eq!(get_type(&y)?, output, "{input} -> {output}");

            if let Some(x) = equal_length_multivariate(input)? {
                let result = convert_collection(&x, output);
                if output.supports_multivariate() {
                    assert_eq!(get_type(&*result?)?, output, "{input} -> {output}");
                } else {
                    let err = result.expect_err("multivariate into univariate-only layout");
                    assert!(err.is_type_error());
                    assert!(err.to_string().contains("Cannot convert multivariate"), "{err}");
                }
            }

            if let Some(x) = unequal_length_univariate(input)? {
                let result = convert_collection(&x, output);
                if output.supports_unequal_length() {
                    assert_eq!(get_type(&*result?)?, output, "{input} -> {output}");
                } else {
                    let err = result.expect_err("unequal length into fixed layout");
                    assert!(err.is_type_error());
                    assert!(err.to_string().contains("Cannot convert unequal"), "{err}");
                }
            }
        }
    }
    Ok(())
}

#[test]
fn round_trips_preserve_values() -> Result<()> {
    let reference = random_numpy3d(1, N_CASES, 1, N_TIMEPOINTS);
    for a in CollectionType::ALL {
        for b in CollectionType::ALL {
            let x = equal_length_univariate(a)?;
            let there = convert_collection(&x, b)?.into_owned();
            let back = convert_collection(&there, a)?.into_owned();
            assert_eq!(back, x, "{a} -> {b} -> {a}");
            assert_eq!(get_n_cases(&back)?, N_CASES);
            assert_eq!(get_n_channels(&back)?, 1);

            let as_array = convert_collection(&back, CollectionType::Numpy3D)?;
            assert_eq!(*as_array, Collection::Numpy3D(reference.clone()));
        }
    }
    Ok(())
}

#[test]
fn multivariate_round_trips_preserve_values() -> Result<()> {
    for a in CollectionType::MULTIVARIATE {
        for b in CollectionType::MULTIVARIATE {
            let x = equal_length_multivariate(a)?.context("multivariate fixture")?;
            let back = convert_collection(&*convert_collection(&x, b)?, a)?.into_owned();
            assert_eq!(back, x, "{a} -> {b} -> {a}");
        }
    }
    Ok(())
}

#[test]
fn unequal_length_round_trips_preserve_lengths() -> Result<()> {
    for a in CollectionType::UNEQUAL_LENGTH {
        for b in CollectionType::UNEQUAL_LENGTH {
            let x = unequal_length_univariate(a)?.context("unequal fixture")?;
            let back = convert_collection(&*convert_collection(&x, b)?, a)?.into_owned();
            assert_eq!(back, x, "{a} -> {b} -> {a}");
            assert!(!is_equal_length(&back)?);
        }
    }
    Ok(())
}

#[test]
fn df_list_tables_are_length_by_channels() -> Result<()> {
    for input in CollectionType::ALL {
        let x = convert_collection(&equal_length_univariate(input)?, CollectionType::DfList)?
            .into_owned();
        let Collection::DfList(batches) = x else {
            panic!("expected df-list from {input}");
        };
        assert_eq!((batches[0].num_rows(), batches[0].num_columns()), (20, 1));

        if let Some(x) = equal_length_multivariate(input)? {
            let Collection::DfList(batches) =
                convert_collection(&x, CollectionType::DfList)?.into_owned()
            else {
                panic!("expected df-list from {input}");
            };
            assert_eq!((batches[0].num_rows(), batches[0].num_columns()), (20, 2));
        }
    }
    Ok(())
}

#[test]
fn hand_built_df_list_reads_columns_as_channels() -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("temperature", DataType::Float64, true),
        Field::new("pressure", DataType::Float64, true),
    ]));
    let case = |offset: f64| -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Float64Array::from(vec![offset, offset + 1.0, offset + 2.0])),
            Arc::new(Float64Array::from(vec![-offset, -offset - 1.0, -offset - 2.0])),
        ];
        Ok(RecordBatch::try_new(schema.clone(), columns)?)
    };
    let x = Collection::from(vec![case(0.0)?, case(10.0)?]);

    let y = convert_collection(&x, CollectionType::Numpy3D)?;
    let expected: Array3<f64> = array![
        [[0.0, 1.0, 2.0], [-0.0, -1.0, -2.0]],
        [[10.0, 11.0, 12.0], [-10.0, -11.0, -12.0]],
    ];
    assert_eq!(*y, Collection::Numpy3D(expected));
    Ok(())
}

#[test]
fn resolves_equal_length_inner_type() -> Result<()> {
    assert_eq!(resolve_equal_length_inner_type(&["numpy3D"])?, CollectionType::Numpy3D);
    assert_eq!(
        resolve_equal_length_inner_type(&["np-list", "numpy3D", "FOOBAR"])?,
        CollectionType::Numpy3D
    );
    assert_eq!(
        resolve_equal_length_inner_type(&["pd-wide", "np-list"])?,
        CollectionType::NpList
    );
    Ok(())
}

#[test]
fn resolves_unequal_length_inner_type() -> Result<()> {
    assert_eq!(resolve_unequal_length_inner_type(&["np-list"])?, CollectionType::NpList);
    assert_eq!(
        resolve_unequal_length_inner_type(&["np-list", "numpy3D"])?,
        CollectionType::NpList
    );
    Ok(())
}

#[test]
fn counts_cases_in_every_layout() -> Result<()> {
    for layout in CollectionType::ALL {
        let x = equal_length_univariate(layout)?;
        assert_eq!(get_n_cases(&x)?, 10, "{layout}");
        assert_eq!(get_n_timepoints(&x)?, N_TIMEPOINTS, "{layout}");
    }
    Ok(())
}

#[test]
fn reports_type_of_every_layout() -> Result<()> {
    for layout in CollectionType::ALL {
        assert_eq!(get_type(&equal_length_univariate(layout)?)?, layout);
    }
    Ok(())
}

#[test]
fn equal_length_fixtures_are_equal_length() -> Result<()> {
    for layout in CollectionType::ALL {
        let x = equal_length_univariate(layout)?;
        assert!(equal_length(&x, layout)?, "{layout}");
        assert!(is_equal_length(&x)?, "{layout}");
    }
    Ok(())
}

#[test]
fn unequal_length_fixtures_are_unequal_length() -> Result<()> {
    for layout in [CollectionType::DfList, CollectionType::NpList, CollectionType::PdMultiIndex] {
        let x = unequal_length_univariate(layout)?.context("unequal fixture")?;
        assert!(!equal_length(&x, layout)?, "{layout}");
        assert!(!is_equal_length(&x)?, "{layout}");
        assert!(get_n_timepoints(&x).is_err());
    }
    Ok(())
}

#[test]
fn detects_missing_values() -> Result<()> {
    for layout in CollectionType::ALL {
        assert!(!has_missing(&equal_length_univariate(layout)?)?, "{layout}");

        let mut x = random_numpy3d(7, N_CASES, 1, N_TIMEPOINTS);
        x[[5, 0, 12]] = f64::NAN;
        let x = Collection::Numpy3D(x);
        let x = convert_collection(&x, layout)?;
        assert!(has_missing(&x)?, "{layout}");
    }

    let mut x = random_numpy3d(8, 10, 2, 20);
    x[[5, 1, 12]] = f64::NAN;
    assert!(has_missing(&Collection::Numpy3D(x))?);
    Ok(())
}

#[test]
fn detects_univariate() -> Result<()> {
    for layout in CollectionType::ALL {
        assert!(is_univariate(&equal_length_univariate(layout)?)?, "{layout}");
        if let Some(x) = equal_length_multivariate(layout)? {
            assert!(!is_univariate(&x)?, "{layout}");
        }
    }
    Ok(())
}

#[test]
fn numpy3d_converters_reject_other_inputs() {
    let numpy3d: [Converter; 5] = [
        from_numpy3d_to_pd_wide,
        from_numpy3d_to_np_list,
        from_numpy3d_to_df_list,
        from_numpy3d_to_numpy2d,
        from_numpy3d_to_pd_multiindex,
    ];
    let x = Collection::from(Array2::<f64>::zeros((10, 20)));
    for f in numpy3d {
        let err = f(&x).expect_err("2D input");
        assert!(err.is_type_error());
        assert!(err.to_string().contains("Input should be 3-dimensional NumPy array"));
    }
}

#[test]
fn numpy2d_converters_reject_other_inputs() {
    let numpy2d: [Converter; 5] = [
        from_numpy2d_to_numpy3d,
        from_numpy2d_to_np_list,
        from_numpy2d_to_df_list,
        from_numpy2d_to_pd_wide,
        from_numpy2d_to_pd_multiindex,
    ];
    let x = Collection::from(random_numpy3d(4, 10, 2, 20));
    for f in numpy2d {
        let err = f(&x).expect_err("3D input");
        assert!(err.is_type_error());
        assert!(err.to_string().contains("Input numpy not of type numpy2D"));
    }
}

#[test]
fn layout_tags_serialize_as_names() -> Result<()> {
    let json = serde_json::to_string(&CollectionType::ALL)?;
    assert_eq!(
        json,
        r#"["numpy3D","np-list","df-list","numpy2D","pd-wide","pd-multiindex"]"#
    );
    let parsed: Vec<CollectionType> = serde_json::from_str(r#"["pd-multiindex","numpy2D"]"#)?;
    assert_eq!(parsed, vec![CollectionType::PdMultiIndex, CollectionType::Numpy2D]);
    Ok(())
}
